//! SessionStore: secondary storage tier scoped to one process session.
//!
//! A scratch JSON file in the OS temp dir, named with a per-session UUID so
//! parallel sessions never collide. Synchronous string get/set, genuinely
//! fallible (temp dir may be unwritable), gone after the session - the same
//! shape and stakes as browser sessionStorage.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use uuid::Uuid;

use super::StorageTier;

/// Session-scoped string key-value tier.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a fresh session scope under the OS temp dir.
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("youcoder-session-{}.json", Uuid::new_v4()));
        debug!("SessionStore at {}", path.display());
        Self { path }
    }

    /// Create a store over an explicit path (tests, custom scoping).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

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
            .with_context(|| format!("Malformed session file {}", self.path.display()))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageTier for SessionStore {
    fn name(&self) -> &'static str {
        "session"
    }

    fn try_read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.shift_remove(key))
    }

    fn try_write(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        let raw = serde_json::to_string(&map)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        // Session scope ends with the store; leftover scratch files are noise
        let _ = fs::remove_file(&self.path);
    }
}
