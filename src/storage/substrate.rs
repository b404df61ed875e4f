//! Key-value persistence substrate
//!
//! The entry store never touches files directly; it reads and writes whole
//! collections as text values under fixed keys. Two implementations:
//! - `FileStore`: one `<key>.json` file per key inside a data directory
//! - `MemoryStore`: an in-process map, for tests and embedding
//!
//! Both can enforce a byte quota over all stored values, which is how a
//! browser's local storage behaves when it fills up.

use crate::storage::error::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A string-keyed, string-valued store
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if it was never written
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the value under `key`
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> StoreResult<()>;

    /// All keys currently present, sorted
    fn keys(&self) -> StoreResult<Vec<String>>;
}

/// Keys map to file names, so only a conservative character set is allowed
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

fn check_quota(key: &str, limit: Option<u64>, others: u64, value: &str) -> StoreResult<()> {
    if let Some(limit) = limit {
        let needed = others + value.len() as u64;
        if needed > limit {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                limit,
            });
        }
    }
    Ok(())
}

/// In-memory substrate
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: refuse writes that would push the total size past `bytes`
    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// Total bytes stored across all keys
    pub fn used_bytes(&self) -> u64 {
        self.values.values().map(|v| v.len() as u64).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        let others: u64 = self
            .values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len() as u64)
            .sum();
        check_quota(key, self.quota_bytes, others, value)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.values.remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}

/// File-backed substrate: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            quota_bytes: None,
        })
    }

    /// Builder: refuse writes that would push the total size past `bytes`
    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// Get the data directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Total bytes stored across all keys
    pub fn used_bytes(&self) -> StoreResult<u64> {
        self.used_bytes_excluding(None)
    }

    fn used_bytes_excluding(&self, skip: Option<&str>) -> StoreResult<u64> {
        let mut total = 0;
        for key in self.keys()? {
            if Some(key.as_str()) == skip {
                continue;
            }
            total += std::fs::metadata(self.path_for(&key))?.len();
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        if self.quota_bytes.is_some() {
            let others = self.used_bytes_excluding(Some(key))?;
            check_quota(key, self.quota_bytes, others, value)?;
        }

        // Write-then-rename so a crash never leaves a half-written collection
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        tracing::trace!(key = %key, bytes = value.len(), "Wrote substrate value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if validate_key(stem).is_ok() {
                        keys.push(stem.to_string());
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "one").unwrap();
        store.set("b", "two").unwrap();
        store.set("a", "uno").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("uno"));
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
        assert_eq!(store.used_bytes(), 6);

        store.remove("a").unwrap();
        store.remove("missing").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemoryStore::new().with_quota(10);
        store.set("a", "12345").unwrap();
        // Replacing a value only counts the new size
        store.set("a", "1234567890").unwrap();

        let err = store.set("b", "x").unwrap_err();
        assert!(matches!(
            err,
            StoreError::QuotaExceeded {
                needed: 11,
                limit: 10,
                ..
            }
        ));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.set("", "x"), Err(StoreError::InvalidKey(_))));
        assert!(store.set("thoughtRecords", "x").is_ok());
        assert!(store.set("mood-tracker-data", "x").is_ok());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("mood-tracker-data").unwrap(), None);
        store.set("mood-tracker-data", "[1,2,3]").unwrap();
        store.set("journal-entries-data", "[]").unwrap();

        assert_eq!(
            store.get("mood-tracker-data").unwrap().as_deref(),
            Some("[1,2,3]")
        );
        assert!(store.path_for("mood-tracker-data").exists());
        assert_eq!(
            store.keys().unwrap(),
            vec!["journal-entries-data", "mood-tracker-data"]
        );
        assert_eq!(store.used_bytes().unwrap(), 9);

        // A second handle over the same directory sees the same data
        let reopened = FileStore::open(dir.path().join("data")).unwrap();
        assert_eq!(
            reopened.get("journal-entries-data").unwrap().as_deref(),
            Some("[]")
        );

        store.remove("mood-tracker-data").unwrap();
        store.remove("mood-tracker-data").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["journal-entries-data"]);
    }

    #[test]
    fn test_file_store_quota() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap().with_quota(8);

        store.set("a", "1234").unwrap();
        store.set("a", "12345678").unwrap();
        let err = store.set("b", "9").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_file_store_ignores_foreign_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join(".a.json.tmp"), "partial").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
