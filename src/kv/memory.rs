//! In-memory KV store implementation using `DashMap`.
//!
//! Data lives as long as the store value does, like a single page session.
//! For storage that outlives the process, use `FileKvStore`.

use super::KvStore;
use crate::Result;
use dashmap::DashMap;

/// In-memory key-value store using lock-free concurrent hashmap.
///
/// # Example
///
/// ```rust
/// use ab_testing_toolkit::kv::{KvStore, MemoryKvStore};
///
/// # fn example() -> ab_testing_toolkit::Result<()> {
/// let store = MemoryKvStore::new();
/// store.set("hello", "world".to_string())?;
/// assert_eq!(store.get("hello")?, Some("world".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryKvStore {
    store: DashMap<String, String>,
}

impl MemoryKvStore {
    /// Create a new in-memory KV store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Get the number of entries in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryKvStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            store: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.store.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_kv_from_iter() {
        let store: MemoryKvStore = [("a", "1"), ("b", "2")].into_iter().collect();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_memory_kv_clear() {
        let store = MemoryKvStore::new();
        store.set("key1", "value1".to_string()).unwrap();
        store.set("key2", "value2".to_string()).unwrap();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.get("key1").unwrap(), None);
    }
}
