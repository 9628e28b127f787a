// ABOUTME: Secret store adapter module exports
// ABOUTME: Platform keyring backend plus an in-memory store for tests and embedding

pub mod memory;
pub mod platform;

pub use memory::MemoryStore;
pub use platform::KeyringStore;

use crate::error::StoreError;
use crate::models::SecretKey;

/// A credential vault addressed by (service, account)
///
/// Implementations never retry; transient failures surface as
/// `StoreError::Unavailable` and the caller decides what to do.
pub trait SecretStore: Send + Sync {
    /// Store a secret, overwriting any existing value for the key
    fn set(&self, key: &SecretKey, secret: &str) -> Result<(), StoreError>;

    /// Fetch the secret for the key
    fn get(&self, key: &SecretKey) -> Result<String, StoreError>;

    /// Remove the secret. Absent keys are reported as `NotFound`.
    fn delete(&self, key: &SecretKey) -> Result<(), StoreError>;
}

impl<S: SecretStore + ?Sized> SecretStore for Box<S> {
    fn set(&self, key: &SecretKey, secret: &str) -> Result<(), StoreError> {
        (**self).set(key, secret)
    }

    fn get(&self, key: &SecretKey) -> Result<String, StoreError> {
        (**self).get(key)
    }

    fn delete(&self, key: &SecretKey) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

pub(crate) fn not_found(key: &SecretKey) -> StoreError {
    StoreError::NotFound {
        service: key.service.clone(),
        account: key.account.clone(),
    }
}
