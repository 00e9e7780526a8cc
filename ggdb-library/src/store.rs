//! Size-bounded string key-value stores backing the persisted cache.
//!
//! The cache codec only needs three operations, so both the in-memory store
//! (tests, ephemeral hosts) and the directory-backed store implement the
//! same small trait. An absent key is empty state, not an error.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("Invalid store key '{0}'")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// String slots keyed by name.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

// ── Memory Store ────────────────────────────────────────────────────────────

/// Process-lifetime store. Keys and values both count against the quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    quota: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: u64) -> Self {
        Self {
            slots: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Total bytes currently held.
    pub fn used_bytes(&self) -> u64 {
        self.slots
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let existing = self
                .slots
                .get(key)
                .map(|v| (key.len() + v.len()) as u64)
                .unwrap_or(0);
            let needed = self.used_bytes() - existing + (key.len() + value.len()) as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.slots.remove(key);
        Ok(())
    }
}

// ── File Store ──────────────────────────────────────────────────────────────

const SLOT_EXTENSION: &str = "slot";

/// One file per slot inside a directory, written atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<u64>,
}

/// Returns `~/.cache/ggdb/store/`.
pub fn default_store_dir() -> PathBuf {
    let cache = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
    cache.join("ggdb").join("store")
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{SLOT_EXTENSION}")))
    }

    /// Size of every slot file except `skip`.
    fn used_bytes_except(&self, skip: &Path) -> u64 {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(_) => return 0,
        };
        entries
            .flatten()
            .filter(|e| {
                let path = e.path();
                path != skip && path.extension().and_then(|e| e.to_str()) == Some(SLOT_EXTENSION)
            })
            .filter_map(|e| e.metadata().ok().map(|m| m.len()))
            .sum()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_except(&path) + value.len() as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension(format!("{SLOT_EXTENSION}.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_enforces_quota_per_total() {
        let mut store = MemoryStore::with_quota(20);
        store.set("a", "0123456789").unwrap();
        // replacing the same slot only counts the new value
        store.set("a", "0123456789abcdef").unwrap();
        let err = store.set("b", "0123").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { quota: 20, .. }));
        assert_eq!(store.get("a").unwrap().as_deref(), Some("0123456789abcdef"));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn file_store_round_trip_and_remove() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("store"));

        assert_eq!(store.get("ggdb_games").unwrap(), None);
        store.set("ggdb_games", "[]").unwrap();
        assert_eq!(store.get("ggdb_games").unwrap().as_deref(), Some("[]"));

        store.remove("ggdb_games").unwrap();
        store.remove("ggdb_games").unwrap();
        assert_eq!(store.get("ggdb_games").unwrap(), None);
    }

    #[test]
    fn file_store_quota_leaves_previous_value() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path()).with_quota(Some(8));
        store.set("slot", "1234").unwrap();
        assert!(store.set("slot", "123456789").is_err());
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(matches!(store.get("../etc"), Err(StoreError::InvalidKey(_))));
    }
}
