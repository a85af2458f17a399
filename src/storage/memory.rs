use std::collections::BTreeMap;

use super::{Storage, StorageError};

/// In-process store. An optional byte quota mimics a browser storage limit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(self.used_without(key));
            if needed > available {
                return Err(StorageError::QuotaExceeded { needed, available });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_rejects_oversized_writes() {
        let mut storage = MemoryStorage::with_quota(16);
        storage.set("a", "0123456789").unwrap();
        let err = storage.set("b", "0123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));

        // Overwriting an existing key only counts the new value.
        storage.set("a", "9876543210").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("9876543210"));
        assert_eq!(storage.keys().unwrap(), vec!["a".to_string()]);
    }
}
