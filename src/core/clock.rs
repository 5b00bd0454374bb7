//! VideoClock: read-only playback position source.
//!
//! The tracker stamps action records from whatever surface is hosting the
//! video. Seconds-to-milliseconds conversion lives here and nowhere else:
//! `floor(seconds * 1000)`. A missing clock reads as position 0.

use std::sync::Mutex;

/// Read-only "current playback position" seam.
pub trait VideoClock: Send + Sync {
    /// Current playback position in seconds. May move backward (user seek).
    fn position_secs(&self) -> f64;
}

/// Convert a clock reading to integer milliseconds.
pub fn position_ms(clock: Option<&dyn VideoClock>) -> u64 {
    match clock {
        Some(clock) => (clock.position_secs() * 1000.0).floor().max(0.0) as u64,
        None => 0,
    }
}

/// Settable clock for the CLI shell and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: Mutex<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the playhead. Backward moves are legal.
    pub fn set(&self, secs: f64) {
        *self.secs.lock().unwrap_or_else(|e| e.into_inner()) = secs;
    }
}

impl VideoClock for ManualClock {
    fn position_secs(&self) -> f64 {
        *self.secs.lock().unwrap_or_else(|e| e.into_inner())
    }
}
