// ABOUTME: Secret store backed by the operating system credential vault
// ABOUTME: Keychain on macOS, Credential Manager on Windows, Secret Service on Linux

use keyring::Entry;

use super::{not_found, SecretStore};
use crate::error::StoreError;
use crate::models::SecretKey;

/// Provides secret storage using the operating system keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(key: &SecretKey) -> Result<Entry, StoreError> {
        Entry::new(&key.service, &key.account).map_err(|e| map_keyring_error(key, e))
    }
}

impl SecretStore for KeyringStore {
    fn set(&self, key: &SecretKey, secret: &str) -> Result<(), StoreError> {
        log::debug!("Storing secret for {}/{} in platform keyring", key.service, key.account);
        Self::entry(key)?
            .set_password(secret)
            .map_err(|e| map_keyring_error(key, e))
    }

    fn get(&self, key: &SecretKey) -> Result<String, StoreError> {
        log::debug!("Reading secret for {}/{} from platform keyring", key.service, key.account);
        Self::entry(key)?
            .get_password()
            .map_err(|e| map_keyring_error(key, e))
    }

    fn delete(&self, key: &SecretKey) -> Result<(), StoreError> {
        log::debug!("Deleting secret for {}/{} from platform keyring", key.service, key.account);
        Self::entry(key)?
            .delete_password()
            .map_err(|e| map_keyring_error(key, e))
    }
}

/// Translate a keyring failure into the store's error kinds
pub(crate) fn map_keyring_error(key: &SecretKey, err: keyring::Error) -> StoreError {
    match err {
        keyring::Error::NoEntry => not_found(key),
        keyring::Error::NoStorageAccess(e) => StoreError::AccessDenied(e.to_string()),
        keyring::Error::PlatformFailure(e) => StoreError::Unavailable(e.to_string()),
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SecretKey {
        SecretKey::new("postdb_demo", "postgres")
    }

    #[test]
    fn test_no_entry_is_not_found() {
        assert_eq!(
            map_keyring_error(&key(), keyring::Error::NoEntry),
            StoreError::NotFound {
                service: "postdb_demo".to_string(),
                account: "postgres".to_string(),
            }
        );
    }

    #[test]
    fn test_locked_vault_is_access_denied() {
        let err = keyring::Error::NoStorageAccess("collection is locked".into());
        assert_eq!(
            map_keyring_error(&key(), err),
            StoreError::AccessDenied("collection is locked".to_string())
        );
    }

    #[test]
    fn test_platform_failure_is_unavailable() {
        let err = keyring::Error::PlatformFailure("dbus connection refused".into());
        assert_eq!(
            map_keyring_error(&key(), err),
            StoreError::Unavailable("dbus connection refused".to_string())
        );
    }

    #[test]
    fn test_rejected_attribute_is_unavailable() {
        let err = keyring::Error::TooLong("service".to_string(), 255);
        assert!(matches!(
            map_keyring_error(&key(), err),
            StoreError::Unavailable(_)
        ));
    }
}
