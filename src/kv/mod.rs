//! Key-value storage backends for persisted selections
//!
//! The manager keeps all of its durable state in a single slot of a
//! string-valued key-value store, mirroring the browser's `localStorage`:
//! - `MemoryKvStore`: session-only, backed by `DashMap`
//! - `FileKvStore`: JSON file on disk, survives process restarts
//!
//! # Example
//!
//! ```rust
//! use ab_testing_toolkit::kv::{KvStore, MemoryKvStore};
//!
//! # fn example() -> ab_testing_toolkit::Result<()> {
//! let store = MemoryKvStore::new();
//!
//! store.set("key", "value".to_string())?;
//! assert_eq!(store.get("key")?, Some("value".to_string()));
//!
//! store.delete("key")?;
//! assert!(!store.exists("key")?);
//! # Ok(())
//! # }
//! ```

mod file;
mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

use crate::Result;

/// Key-value store holding string values, the shape of web storage.
///
/// All operations are synchronous. Implementations report backend failures
/// (quota exceeded, storage disabled, I/O) as errors; callers propagate them.
pub trait KvStore: Send + Sync {
    /// Get a value by key.
    ///
    /// Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value for a key.
    ///
    /// Overwrites any existing value.
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete a key.
    ///
    /// No-op if the key doesn't exist.
    fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_kv_set_get() {
        let store = MemoryKvStore::new();

        store.set("key1", "value1".to_string()).unwrap();
        let value = store.get("key1").unwrap();

        assert_eq!(value, Some("value1".to_string()));
    }

    #[test]
    fn test_memory_kv_get_nonexistent() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_memory_kv_overwrite() {
        let store = MemoryKvStore::new();

        store.set("key", "value1".to_string()).unwrap();
        store.set("key", "value2".to_string()).unwrap();

        assert_eq!(store.get("key").unwrap(), Some("value2".to_string()));
    }

    #[test]
    fn test_memory_kv_delete_nonexistent() {
        let store = MemoryKvStore::new();

        // Should not error
        store.delete("nonexistent").unwrap();
    }

    #[test]
    fn test_memory_kv_exists() {
        let store = MemoryKvStore::new();

        assert!(!store.exists("key").unwrap());

        store.set("key", String::new()).unwrap();
        assert!(store.exists("key").unwrap());

        store.delete("key").unwrap();
        assert!(!store.exists("key").unwrap());
    }

    #[test]
    fn test_arc_store_shares_state() {
        let store = Arc::new(MemoryKvStore::new());
        let handle = Arc::clone(&store);

        handle.set("shared", "yes".to_string()).unwrap();

        assert_eq!(store.get("shared").unwrap(), Some("yes".to_string()));
        assert_eq!(store.len(), 1);
    }
}
