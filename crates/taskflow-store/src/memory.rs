use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{KeyValueStore, StoreError};

/// Process-local store, optionally capped like a browser storage quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Unbounded empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store that rejects writes once keys and values exceed `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: Mutex::default(),
            quota: Some(limit),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries();
        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    limit,
                });
            }
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_previous_value() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        store.set("a", "1")?;
        store.set("a", "2")?;
        assert_eq!(store.get("a")?.as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn remove_missing_key_is_noop() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        store.remove("missing")?;
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn quota_rejects_oversized_writes_and_keeps_old_value() -> Result<(), StoreError> {
        let store = MemoryStore::with_quota(8);
        store.set("k", "1234")?;
        let Err(err) = store.set("k", "123456789") else {
            panic!("write over quota should fail");
        };
        assert!(matches!(err, StoreError::QuotaExceeded { limit: 8, .. }));
        assert_eq!(store.get("k")?.as_deref(), Some("1234"));
        Ok(())
    }
}
