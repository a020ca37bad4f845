//! File-backed KV store: one JSON object per file.
//!
//! Each operation reads the file, applies the change and writes it back
//! through a temporary file, so a value written by one process is visible to
//! the next one.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::KvStore;
use crate::{Error, Result};

/// Durable key-value store persisted as a JSON object on disk.
///
/// # Example
///
/// ```rust,no_run
/// use ab_testing_toolkit::kv::{FileKvStore, KvStore};
///
/// # fn example() -> ab_testing_toolkit::Result<()> {
/// let store = FileKvStore::new("/tmp/ab-tests.json");
/// store.set("visits", "1".to_string())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKvStore {
    /// Create a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Get the backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                Error::Storage(format!("corrupt store file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let encoded = serde_json::to_string_pretty(entries).map_err(Error::Serialize)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, encoded)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("file store lock poisoned".to_string()))?;
        f()
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_lock(|| Ok(self.load()?.remove(key)))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.with_lock(|| {
            let mut entries = self.load()?;
            entries.insert(key.to_string(), value);
            self.save(&entries)
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.with_lock(|| {
            let mut entries = self.load()?;
            if entries.remove(key).is_some() {
                self.save(&entries)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kv_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("store.json"));

        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!store.exists("anything").unwrap());
    }

    #[test]
    fn test_file_kv_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        FileKvStore::new(&path)
            .set("ab-test-manager", "{}".to_string())
            .unwrap();

        let reopened = FileKvStore::new(&path);
        assert_eq!(
            reopened.get("ab-test-manager").unwrap(),
            Some("{}".to_string())
        );
    }

    #[test]
    fn test_file_kv_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("store.json"));

        store.set("a", "1".to_string()).unwrap();
        store.set("b", "2".to_string()).unwrap();
        store.delete("a").unwrap();
        store.delete("missing").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_file_kv_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let err = FileKvStore::new(&path).get("a").unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
