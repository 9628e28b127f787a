// ABOUTME: Resolver facade turning a logical service name into a connection descriptor
// ABOUTME: Reads the secret fresh on every call and never caches descriptors

use crate::descriptor;
use crate::error::{ResolveError, StoreError};
use crate::models::{ConnectionDescriptor, ConnectionParams, SecretKey};
use crate::secret::SecretStore;

/// Resolves connection descriptors against a secret store
///
/// Holds no state besides the store; every `resolve` goes back to the store
/// so a rotated credential is picked up on the next call.
pub struct Resolver<S> {
    store: S,
}

impl<S: SecretStore> Resolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up the secret for (service, account) and build a descriptor
    pub fn resolve(
        &self,
        service_name: &str,
        params: &ConnectionParams,
    ) -> Result<ConnectionDescriptor, ResolveError> {
        let key = SecretKey::new(service_name, params.account_name());
        log::debug!("Resolving connection for {}/{}", key.service, key.account);

        let secret = self.store.get(&key).map_err(|e| {
            if let StoreError::NotFound { .. } = e {
                log::warn!(
                    "No credential provisioned for service '{}' and account '{}'",
                    key.service,
                    key.account
                );
            }
            ResolveError::from(e)
        })?;

        descriptor::build(params, &secret)
    }

    /// Store the secret for (service, params.account_name)
    pub fn provision(
        &self,
        service_name: &str,
        params: &ConnectionParams,
        secret: &str,
    ) -> Result<(), ResolveError> {
        let key = SecretKey::new(service_name, params.account_name());
        self.store.set(&key, secret)?;
        log::info!("Provisioned credential for {}/{}", key.service, key.account);
        Ok(())
    }
}
