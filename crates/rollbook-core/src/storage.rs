//! Durable key-value backends.
//!
//! The store keeps its whole collection under a single key and rewrites it
//! after every mutation, so a backend only needs whole-value get/set.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;

/// Key holding the JSON-encoded record collection.
pub const STUDENTS_KEY: &str = "students";
/// Key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// A byte-valued key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// On failure the previous value must remain readable.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Map-backed store with an optional byte capacity across all values.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, Vec<u8>>,
    capacity: Option<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: u64) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    pub fn set_capacity_limit(&mut self, capacity: Option<u64>) {
        self.capacity = capacity;
    }

    /// Total bytes currently held.
    pub fn used_bytes(&self) -> u64 {
        self.entries.values().map(|v| v.len() as u64).sum()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if let Some(capacity) = self.capacity {
            let existing = self.entries.get(key).map_or(0, |v| v.len() as u64);
            let needed = self.used_bytes() - existing + value.len() as u64;
            if needed > capacity {
                return Err(StorageError::QuotaExceeded { needed, capacity });
            }
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Filesystem backend
// ---------------------------------------------------------------------------

/// One file per key under a data directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// failed write never truncates the previous value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    capacity: Option<u64>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            capacity: None,
        }
    }

    pub fn with_capacity_limit(mut self, capacity: Option<u64>) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Bytes used by every key file in the directory, excluding `skip`.
    fn used_bytes_excluding(&self, skip: &Path) -> Result<u64, StorageError> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut total = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path == skip || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            total += entry.metadata()?.len();
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if let Some(capacity) = self.capacity {
            let needed = self.used_bytes_excluding(&path)? + value.len() as u64;
            if needed > capacity {
                return Err(StorageError::QuotaExceeded { needed, capacity });
            }
        }

        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), path = %path.display(), "wrote key");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
