//! Application controller: owns and wires the engine objects.
//!
//! App is the one place the storage chain, team registry, tagging session,
//! event bus, and persist worker are constructed and connected. Everything
//! downstream receives references - no ambient globals anywhere in the
//! crate.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::info;

use crate::config::{AppSettings, TIMELINE_STORE_FILE};
use crate::core::{EventBus, PersistQueue, TimelineSession};
use crate::entities::TeamRegistry;
use crate::paths::{self, PathConfig};
use crate::storage::{FallbackChain, FileStore, MemStore, SessionStore, StorageTier};

/// Top-level application state.
pub struct App {
    pub settings: AppSettings,
    pub paths: PathConfig,
    pub chain: Arc<FallbackChain>,
    pub primary: Arc<FileStore>,
    pub registry: TeamRegistry,
    pub session: TimelineSession,
    pub bus: EventBus,
    persist: Arc<PersistQueue>,
}

impl App {
    /// Build the full engine stack over the resolved paths.
    pub fn new(path_config: PathConfig, settings: AppSettings) -> Result<Self> {
        paths::ensure_dirs(&path_config)?;

        let primary = Arc::new(FileStore::new(paths::data_file(
            TIMELINE_STORE_FILE,
            &path_config,
        )));
        let tiers: Vec<Arc<dyn StorageTier>> =
            vec![primary.clone(), Arc::new(SessionStore::new())];
        let chain = Arc::new(FallbackChain::new(tiers, Arc::new(MemStore::new())));

        let bus = EventBus::new();
        let mut session =
            TimelineSession::new(chain.clone(), bus.clone(), settings.save_max_retries);
        let persist = Arc::new(PersistQueue::spawn(
            chain.clone(),
            session.timeline_handle(),
            Duration::from_millis(settings.persist_debounce_ms),
            settings.save_max_retries,
            bus.clone(),
        ));
        session.attach_persist(persist.clone());

        let registry = TeamRegistry::load(primary.clone());

        info!(
            "App ready: store={}, {} team(s)",
            primary.path().display(),
            registry.len()
        );

        Ok(Self {
            settings,
            paths: path_config,
            chain,
            primary,
            registry,
            session,
            bus,
            persist,
        })
    }

    /// Drain the persist queue; call before exit so a pending debounced
    /// save reaches storage.
    pub fn shutdown(&self) {
        self.persist.flush();
    }
}
