//! StorageTier: one backend in the fallback chain.
//!
//! Tiers are string key-value stores (values are serialized JSON). A tier is
//! allowed to fail on read or write - the chain decides what happens next.
//! The terminal tier (MemStore) is the one exception: its writes cannot fail.

use anyhow::Result;

/// One storage backend in the fallback chain.
///
/// Implementations must be shareable across the session and the persist
/// worker thread.
pub trait StorageTier: Send + Sync {
    /// Short tier name for log lines ("file", "session", "memory").
    fn name(&self) -> &'static str;

    /// Read the value stored under `key`. `Ok(None)` means the tier
    /// responded and the key is absent - a valid answer, not an error.
    fn try_read(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value. Entries for
    /// other keys are preserved.
    fn try_write(&self, key: &str, value: &str) -> Result<()>;
}
