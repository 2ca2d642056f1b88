//! In-process list store.

use crate::error::{Error, Result};
use crate::store::{ListStore, UNSET_MARKER};
use parking_lot::RwLock;
use std::collections::HashMap;

/// A [`ListStore`] kept in process memory.
///
/// Behaves like a list-based key-value server: indexing past the end of a
/// sequence fails, reading a missing key yields `None`. Safe to share between
/// threads; each call takes the lock once.
#[derive(Debug, Default)]
pub struct MemoryListStore {
    lists: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryListStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently holding a sequence, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lists.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Replace the sequence at `key` with `values`.
    pub fn insert_raw(&self, key: &str, values: Vec<String>) {
        self.lists.write().insert(key.to_string(), values);
    }
}

impl ListStore for MemoryListStore {
    fn get_length(&self, key: &str) -> Result<u64> {
        Ok(self.lists.read().get(key).map_or(0, |list| list.len() as u64))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lists.write().remove(key);
        Ok(())
    }

    fn create_sequence(&self, key: &str, length: u64) -> Result<()> {
        let length = usize::try_from(length)
            .map_err(|_| Error::invalid_argument(format!("Sequence too long: {}", length)))?;
        self.lists
            .write()
            .insert(key.to_string(), vec![UNSET_MARKER.to_string(); length]);
        Ok(())
    }

    fn set_element(&self, key: &str, index: u64, value: &str) -> Result<()> {
        let mut lists = self.lists.write();
        let list = lists
            .get_mut(key)
            .ok_or_else(|| Error::transport(format!("No such key: {}", key)))?;
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| list.get_mut(i))
            .ok_or_else(|| Error::transport(format!("Index {} out of range for {}", index, key)))?;
        *slot = value.to_string();
        Ok(())
    }

    fn get_element(&self, key: &str, index: u64) -> Result<Option<String>> {
        let lists = self.lists.read();
        Ok(lists
            .get(key)
            .and_then(|list| usize::try_from(index).ok().and_then(|i| list.get(i)))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_lifecycle() {
        let store = MemoryListStore::new();
        assert_eq!(store.get_length("k").unwrap(), 0);
        assert_eq!(store.get_element("k", 0).unwrap(), None);

        store.create_sequence("k", 4).unwrap();
        assert_eq!(store.get_length("k").unwrap(), 4);
        assert_eq!(store.get_element("k", 3).unwrap().as_deref(), Some("0"));

        store.set_element("k", 2, "1").unwrap();
        assert_eq!(store.get_element("k", 2).unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys(), vec!["k".to_string()]);

        store.delete("k").unwrap();
        assert_eq!(store.get_length("k").unwrap(), 0);
    }

    #[test]
    fn test_set_out_of_range_fails() {
        let store = MemoryListStore::new();
        assert!(matches!(
            store.set_element("missing", 0, "1"),
            Err(Error::TransportFailure(_))
        ));

        store.create_sequence("k", 2).unwrap();
        assert!(store.set_element("k", 2, "1").is_err());
        assert_eq!(store.get_element("k", 2).unwrap(), None);
    }
}
