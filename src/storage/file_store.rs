//! FileStore: primary storage tier backed by one JSON file.
//!
//! The file holds a single object mapping key -> raw JSON string, so a write
//! for one video id is merged into the existing map and never disturbs other
//! videos' timelines. Insertion order is kept stable across rewrites.
//!
//! Reads and writes go through the filesystem on every call; there is no
//! in-process cache here - the session's in-memory timeline is the cache.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;

use super::StorageTier;

/// JSON-file key-value tier (the "extension storage" stand-in).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store over `path`. The file is created lazily on first write.
    pub fn new(path: PathBuf) -> Self {
        debug!("FileStore at {}", path.display());
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// All keys currently stored (shell listing).
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read_map()?.keys().cloned().collect())
    }

    /// Read the whole map, treating a missing file as empty.
    fn read_map(&self) -> Result<IndexMap<String, String>> {
        if !self.path.exists() {
            return Ok(IndexMap::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(IndexMap::new());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed store file {}", self.path.display()))
    }

    /// Write the whole map back.
    fn write_map(&self, map: &IndexMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl StorageTier for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn try_read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.shift_remove(key))
    }

    fn try_write(&self, key: &str, value: &str) -> Result<()> {
        // Read-merge-write: only this key's entry changes
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        debug!("FileStore wrote {} ({} bytes)", key, value.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileStore {
        let path = std::env::temp_dir()
            .join(format!("youcoder-test-{}", uuid::Uuid::new_v4()))
            .join("store.json");
        FileStore::new(path)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let store = temp_store();
        assert!(store.try_read("vid1").unwrap().is_none());
    }

    #[test]
    fn test_write_merges_keys() {
        let store = temp_store();
        store.try_write("vid1", "[\"a\"]").unwrap();
        store.try_write("vid2", "[\"b\"]").unwrap();
        // Second write must not clobber the first key
        assert_eq!(store.try_read("vid1").unwrap().as_deref(), Some("[\"a\"]"));
        assert_eq!(store.try_read("vid2").unwrap().as_deref(), Some("[\"b\"]"));
    }

    #[test]
    fn test_survives_reopen() {
        let store = temp_store();
        store.try_write("vid1", "42").unwrap();

        let reopened = FileStore::new(store.path().clone());
        assert_eq!(reopened.try_read("vid1").unwrap().as_deref(), Some("42"));
    }
}
