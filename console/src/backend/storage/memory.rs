//! In-memory [`StateStore`], shared between clones.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{StateStore, StorageKey};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<StorageKey, String>> {
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, key: StorageKey) -> bool {
        self.documents().contains_key(&key)
    }
}

impl StateStore for MemoryStore {
    fn read(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.documents().get(&key).cloned())
    }

    fn write(&self, key: StorageKey, contents: &str) -> Result<()> {
        self.documents().insert(key, contents.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        self.documents().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_documents() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.write(StorageKey::Logs, "[]").unwrap();
        assert_eq!(other.read(StorageKey::Logs).unwrap().as_deref(), Some("[]"));

        other.remove(StorageKey::Logs).unwrap();
        assert!(!store.contains(StorageKey::Logs));
        assert!(store.remove(StorageKey::Logs).is_ok());
    }
}
