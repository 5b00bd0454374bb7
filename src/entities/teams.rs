//! TeamRegistry: ordered, deduplicated list of team names.
//!
//! Persisted through the primary storage tier only - no fallback chain.
//! Team lists are small and cheap to re-enter, unlike an in-progress tagging
//! session, so a lost write here is an inconvenience, not data loss.

use std::sync::Arc;

use indexmap::IndexSet;
use log::{error, info};

use crate::storage::StorageTier;

/// Storage key the registry lives under on the primary tier.
const TEAMS_KEY: &str = "teams";

/// Ordered set of unique team names backed by one storage tier.
pub struct TeamRegistry {
    teams: IndexSet<String>,
    store: Arc<dyn StorageTier>,
}

impl TeamRegistry {
    /// Load the registry from `store`, starting empty if the key is absent
    /// or the tier read fails.
    pub fn load(store: Arc<dyn StorageTier>) -> Self {
        let teams = match store.try_read(TEAMS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    error!("Corrupt team registry, starting empty: {}", e);
                    IndexSet::new()
                }
            },
            Ok(None) => IndexSet::new(),
            Err(e) => {
                error!("Failed to read team registry from {}: {}", store.name(), e);
                IndexSet::new()
            }
        };

        if !teams.is_empty() {
            info!("Loaded {} team(s)", teams.len());
        }

        Self { teams, store }
    }

    /// Append `name` if not already present (exact string match), then persist.
    pub fn add(&mut self, name: &str) {
        if self.teams.insert(name.to_string()) {
            self.persist();
        }
    }

    /// Remove `name` if present; silent no-op otherwise. Persists on change.
    pub fn remove(&mut self, name: &str) {
        if self.teams.shift_remove(name) {
            self.persist();
        }
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.teams.contains(name)
    }

    /// Ordered snapshot of the current registry.
    pub fn teams(&self) -> Vec<String> {
        self.teams.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Write the registry to the primary tier. Failures are logged and
    /// swallowed - the in-memory registry stays authoritative for the session.
    fn persist(&self) {
        let list: Vec<&String> = self.teams.iter().collect();
        let raw = match serde_json::to_string(&list) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to serialize team registry: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.try_write(TEAMS_KEY, &raw) {
            error!("Failed to persist team registry to {}: {}", self.store.name(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStore;

    fn registry() -> TeamRegistry {
        TeamRegistry::load(Arc::new(MemStore::new()))
    }

    #[test]
    fn test_add_dedupes() {
        let mut reg = registry();
        reg.add("X");
        reg.add("X");
        assert_eq!(reg.teams(), vec!["X"]);
    }

    #[test]
    fn test_order_preserved() {
        let mut reg = registry();
        reg.add("Blue");
        reg.add("Red");
        reg.add("Green");
        assert_eq!(reg.teams(), vec!["Blue", "Red", "Green"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut reg = registry();
        reg.add("Blue");
        reg.remove("Red");
        assert_eq!(reg.teams(), vec!["Blue"]);
    }

    #[test]
    fn test_round_trip_through_store() {
        let store: Arc<MemStore> = Arc::new(MemStore::new());
        {
            let mut reg = TeamRegistry::load(store.clone());
            reg.add("Blue");
            reg.add("Red");
            reg.remove("Blue");
        }
        let reg = TeamRegistry::load(store);
        assert_eq!(reg.teams(), vec!["Red"]);
    }
}
