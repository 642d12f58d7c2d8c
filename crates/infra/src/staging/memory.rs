/// In-memory session store for the staging layer
use std::collections::HashMap;

use parking_lot::Mutex;
use tallysync_core::SessionStore;
use tallysync_domain::{Result, TallySyncError};

/// Process-local [`SessionStore`].
///
/// Entries live for the lifetime of the process, mirroring the scoped-storage
/// contract staging was designed against. An optional byte quota makes the
/// quota-exhausted failure mode reproducible.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
    max_bytes: Option<usize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once total stored bytes would exceed
    /// `max_bytes`.
    pub fn with_quota(max_bytes: usize) -> Self {
        Self { entries: Mutex::new(HashMap::new()), max_bytes: Some(max_bytes) }
    }

    fn stored_bytes(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl SessionStore for MemorySessionStore {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();

        if let Some(quota) = self.max_bytes {
            let current = Self::stored_bytes(&entries)
                - entries.get(key).map_or(0, |old| key.len() + old.len());
            if current + key.len() + value.len() > quota {
                return Err(TallySyncError::Database(format!(
                    "session store quota of {quota} bytes exceeded"
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_removes_entries() {
        let store = MemorySessionStore::new();
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));

        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn quota_rejects_oversized_writes() {
        let store = MemorySessionStore::with_quota(10);
        let result = store.set_item("key", "a-value-larger-than-the-quota");
        assert!(matches!(result, Err(TallySyncError::Database(_))));
        assert_eq!(store.get_item("key").unwrap(), None);
    }

    #[test]
    fn overwriting_frees_the_old_entry_first() {
        let store = MemorySessionStore::with_quota(12);
        store.set_item("key", "12345678").unwrap();
        // Same key, same size: must fit because the old value is replaced.
        store.set_item("key", "87654321").unwrap();
        assert_eq!(store.get_item("key").unwrap().as_deref(), Some("87654321"));
    }
}
