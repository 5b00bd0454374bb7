//! FallbackChain: ordered storage tiers with guaranteed forward progress.
//!
//! Saves walk the fallible tiers in priority order and collapse to the
//! terminal in-memory tier when everything else fails, so a tagging session
//! is never lost to a storage hiccup - at worst the data lives only in
//! memory until the next successful save. Loads are decided by the first
//! tier that responds without error.
//!
//! Tiers are tried strictly sequentially within one call; nothing is raced
//! and an in-flight save is never aborted.

use std::sync::Arc;

use log::{debug, error, info, warn};

use super::{MemStore, StorageTier};
use crate::entities::{ActionRecord, Timeline};

/// Fallible tiers attempted before collapsing to the memory tier.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Layered persistence for per-video timelines.
pub struct FallbackChain {
    /// Fallible tiers in priority order (primary first)
    tiers: Vec<Arc<dyn StorageTier>>,
    /// Terminal tier; writes here cannot fail
    terminal: Arc<MemStore>,
}

impl FallbackChain {
    pub fn new(tiers: Vec<Arc<dyn StorageTier>>, terminal: Arc<MemStore>) -> Self {
        Self { tiers, terminal }
    }

    /// Terminal memory tier (diagnostics, tests).
    pub fn terminal(&self) -> &Arc<MemStore> {
        &self.terminal
    }

    /// Number of fallible tiers ahead of the terminal one.
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Persist `actions` under `video_id`.
    ///
    /// A blank `video_id` is a "not applicable" signal: returns `false`
    /// immediately with zero tier I/O. Otherwise up to `max_retries`
    /// fallible tiers are attempted in order; when all of them fail (or
    /// `max_retries` is 0) the write lands in the terminal memory tier,
    /// which cannot fail - so once past the blank-id check this operation
    /// always reports success.
    pub fn save_timeline_for_video(
        &self,
        video_id: &str,
        actions: &[ActionRecord],
        max_retries: usize,
    ) -> bool {
        if video_id.trim().is_empty() {
            return false;
        }

        let payload = match serde_json::to_string(actions) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize timeline for {}: {}", video_id, e);
                return false;
            }
        };

        let attempts = max_retries.min(self.tiers.len());
        for (idx, tier) in self.tiers[..attempts].iter().enumerate() {
            match tier.try_write(video_id, &payload) {
                Ok(()) => {
                    if idx == 0 {
                        debug!("Saved timeline for {} ({} records)", video_id, actions.len());
                    } else {
                        info!("Saved timeline for {} via {} fallback", video_id, tier.name());
                    }
                    return true;
                }
                Err(e) => {
                    error!("{} tier write failed for {}: {}", tier.name(), video_id, e);
                }
            }
        }

        // Terminal tier: plain map assignment, cannot fail
        self.terminal
            .try_write(video_id, &payload)
            .expect("memory tier write is infallible");
        info!("Saved timeline for {} to memory fallback", video_id);
        true
    }

    /// Load the timeline stored under `video_id`.
    ///
    /// Blank id or absent key yields an empty timeline, never an error. The
    /// first tier that responds without error decides the result; later
    /// tiers are only consulted when earlier ones fail outright.
    pub fn load_timeline_for_video(&self, video_id: &str) -> Timeline {
        if video_id.trim().is_empty() {
            return Vec::new();
        }

        for tier in self.tiers.iter().map(|t| t.as_ref() as &dyn StorageTier)
            .chain(std::iter::once(self.terminal.as_ref() as &dyn StorageTier))
        {
            match tier.try_read(video_id) {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<ActionRecord>>(&raw) {
                    Ok(actions) => {
                        debug!(
                            "Loaded {} record(s) for {} from {} tier",
                            actions.len(),
                            video_id,
                            tier.name()
                        );
                        return actions;
                    }
                    Err(e) => {
                        error!("Corrupt timeline for {} on {} tier: {}", video_id, tier.name(), e);
                    }
                },
                Ok(None) => return Vec::new(),
                Err(e) => {
                    warn!("{} tier read failed for {}: {}", tier.name(), video_id, e);
                }
            }
        }

        Vec::new()
    }
}
