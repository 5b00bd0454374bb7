//! Pub/Sub bus for timeline mutation events.
//!
//! Architecture:
//! - Subscribers register callbacks (immediate invocation on emit)
//! - emit() invokes callbacks immediately AND queues for deferred processing
//! - poll() returns queued events for batch processing in a host loop
//!
//! Callback order: FIFO (first-subscribed, first-called). The bus handle is
//! cheap to clone and shared between the session, the persist worker, and
//! the shell.

use std::sync::{Arc, Mutex, RwLock};

use log::warn;

/// Maximum events in the deferred queue before oldest are evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// Everything the tracker and persist worker announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    ActionStarted { team: String, action: String, start: u64 },
    ActionStopped { team: String, action: String, end: u64 },
    LabelAdded { team: String, action: String, label: String },
    ActionDeleted { team: String, action: String, start: u64 },
    TimelineLoaded { video_id: String, count: usize },
    TimelineSaved { video_id: String },
}

type Callback = Arc<dyn Fn(&TimelineEvent) + Send + Sync>;

/// Timeline event bus with deferred processing support.
///
/// Two modes work together: callbacks fire immediately on emit(), and the
/// same events are available for batch retrieval via poll().
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Callback>>>,
    queue: Arc<Mutex<Vec<TimelineEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to all timeline events.
    ///
    /// The callback is invoked on the emitting thread - keep it short and
    /// route state mutations through an `Arc<Mutex<..>>`.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&TimelineEvent) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(callback));
    }

    /// Emit an event: invoke callbacks immediately, then queue it for poll().
    pub fn emit(&self, event: TimelineEvent) {
        for cb in self.subscribers.read().unwrap_or_else(|e| e.into_inner()).iter() {
            cb(&event);
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = queue.len() / 2;
            warn!("EventBus queue full ({} events), evicting oldest {}", queue.len(), evict_count);
            queue.drain(0..evict_count);
        }
        queue.push(event);
    }

    /// Drain and return all queued events (oldest first).
    pub fn poll(&self) -> Vec<TimelineEvent> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *queue)
    }
}
