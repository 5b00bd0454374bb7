//! MemStore: terminal in-process storage tier.
//!
//! A plain map behind a mutex. Writes are pure assignments and cannot fail,
//! which is what makes the fallback chain's "save always eventually
//! succeeds" guarantee hold. Contents die with the process.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;

use super::StorageTier;

/// Infallible in-memory key-value tier.
#[derive(Debug, Default)]
pub struct MemStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (test/diagnostic helper).
    pub fn len(&self) -> usize {
        self.map.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageTier for MemStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn try_read(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn try_write(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
