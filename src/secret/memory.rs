// ABOUTME: In-process secret store
// ABOUTME: Same overwrite and not-found semantics as the platform keyring

use std::collections::HashMap;
use std::sync::Mutex;

use super::{not_found, SecretStore};
use crate::error::StoreError;
use crate::models::SecretKey;

#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<SecretKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SecretKey, String>>, StoreError> {
        self.secrets
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl SecretStore for MemoryStore {
    fn set(&self, key: &SecretKey, secret: &str) -> Result<(), StoreError> {
        log::debug!("Storing secret for {}/{} in memory", key.service, key.account);
        self.lock()?.insert(key.clone(), secret.to_string());
        Ok(())
    }

    fn get(&self, key: &SecretKey) -> Result<String, StoreError> {
        log::debug!("Reading secret for {}/{} from memory", key.service, key.account);
        self.lock()?
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(key))
    }

    fn delete(&self, key: &SecretKey) -> Result<(), StoreError> {
        log::debug!("Deleting secret for {}/{} from memory", key.service, key.account);
        self.lock()?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| not_found(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = MemoryStore::new();
        let key = SecretKey::new("postdb_demo", "postgres");

        store.set(&key, "john").unwrap();
        assert_eq!(store.get(&key).unwrap(), "john");

        store.delete(&key).unwrap();
        assert_eq!(store.get(&key), Err(not_found(&key)));
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryStore::new();
        let key = SecretKey::new("postdb_demo", "postgres");

        store.set(&key, "first").unwrap();
        store.set(&key, "second").unwrap();
        assert_eq!(store.get(&key).unwrap(), "second");
    }

    #[test]
    fn test_delete_absent_is_not_found() {
        let store = MemoryStore::new();
        let key = SecretKey::new("postdb_demo", "postgres");
        assert!(matches!(store.delete(&key), Err(StoreError::NotFound { .. })));
    }

    struct CapturingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl log::Log for CapturingLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push(format!("{} {}", record.level(), record.args()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger {
        lines: Mutex::new(Vec::new()),
    };

    #[test]
    fn test_every_call_logs_at_debug() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);

        let store = MemoryStore::new();
        let key = SecretKey::new("audited_svc", "audited_acct");
        store.set(&key, "hunter2").unwrap();
        store.get(&key).unwrap();
        store.delete(&key).unwrap();

        let lines = LOGGER.lines.lock().unwrap();
        let ours: Vec<&String> = lines
            .iter()
            .filter(|l| l.contains("audited_svc/audited_acct"))
            .collect();
        for verb in ["Storing", "Reading", "Deleting"] {
            assert!(
                ours.iter().any(|l| l.starts_with("DEBUG") && l.contains(verb)),
                "missing {} record in {:?}",
                verb,
                ours
            );
        }
        assert!(ours.iter().all(|l| !l.contains("hunter2")));
    }

    #[test]
    fn test_accounts_are_independent() {
        let store = MemoryStore::new();
        store.set(&SecretKey::new("svc", "alice"), "a").unwrap();
        store.set(&SecretKey::new("svc", "bob"), "b").unwrap();
        store.set(&SecretKey::new("other", "alice"), "c").unwrap();

        assert_eq!(store.get(&SecretKey::new("svc", "alice")).unwrap(), "a");
        assert_eq!(store.get(&SecretKey::new("svc", "bob")).unwrap(), "b");
        assert_eq!(store.get(&SecretKey::new("other", "alice")).unwrap(), "c");
    }
}
