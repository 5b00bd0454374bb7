//! Debounced persist worker - fire-and-forget saves off the caller's thread.
//!
//! Rapid start/stop/label mutations each schedule a save; requests landing
//! inside the debounce window coalesce into one write (latest video id wins -
//! only one video is active at a time). Each save runs its full fallback
//! chain end-to-end before the next request is handled; an in-flight save is
//! never aborted.
//!
//! **Used by**: TimelineSession (schedule on every mutation), App (flush on
//! shutdown).

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, RecvTimeoutError, Sender};
use log::trace;

use super::event_bus::{EventBus, TimelineEvent};
use crate::entities::Timeline;
use crate::storage::FallbackChain;

enum Request {
    Save(String),
    Flush(Sender<()>),
    Shutdown,
}

/// Handle to the background persist thread.
pub struct PersistQueue {
    tx: Sender<Request>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PersistQueue {
    /// Spawn the worker over a shared timeline and storage chain.
    pub fn spawn(
        chain: Arc<FallbackChain>,
        timeline: Arc<Mutex<Timeline>>,
        debounce: Duration,
        max_retries: usize,
        bus: EventBus,
    ) -> Self {
        let (tx, rx) = unbounded::<Request>();

        let handle = thread::Builder::new()
            .name("youcoder-persist".to_string())
            .spawn(move || {
                trace!("Persist worker started");
                loop {
                    let req = match rx.recv() {
                        Ok(req) => req,
                        Err(_) => break,
                    };
                    match req {
                        Request::Save(mut video_id) => {
                            let mut exit = false;
                            let mut flush_ack = None;

                            // Debounce window: later requests coalesce,
                            // latest video id wins; flush/shutdown cut it short
                            loop {
                                match rx.recv_timeout(debounce) {
                                    Ok(Request::Save(v)) => video_id = v,
                                    Ok(Request::Flush(ack)) => {
                                        flush_ack = Some(ack);
                                        break;
                                    }
                                    Ok(Request::Shutdown) => {
                                        exit = true;
                                        break;
                                    }
                                    Err(RecvTimeoutError::Timeout) => break,
                                    Err(RecvTimeoutError::Disconnected) => {
                                        exit = true;
                                        break;
                                    }
                                }
                            }

                            let snapshot =
                                timeline.lock().unwrap_or_else(|e| e.into_inner()).clone();
                            if chain.save_timeline_for_video(&video_id, &snapshot, max_retries) {
                                bus.emit(TimelineEvent::TimelineSaved {
                                    video_id: video_id.clone(),
                                });
                            }

                            if let Some(ack) = flush_ack {
                                let _ = ack.send(());
                            }
                            if exit {
                                break;
                            }
                        }
                        Request::Flush(ack) => {
                            // Nothing pending - ack right away
                            let _ = ack.send(());
                        }
                        Request::Shutdown => break,
                    }
                }
                trace!("Persist worker stopped");
            })
            .expect("Failed to spawn persist worker");

        Self { tx, handle: Some(handle) }
    }

    /// Request a save of the current timeline under `video_id`.
    /// Non-blocking; the caller never waits on storage I/O.
    pub fn schedule(&self, video_id: &str) {
        trace!("Persist scheduled for {}", video_id);
        let _ = self.tx.send(Request::Save(video_id.to_string()));
    }

    /// Block until every scheduled save (including a pending debounce) has
    /// run its chain to completion.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        if self.tx.send(Request::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for PersistQueue {
    fn drop(&mut self) {
        let _ = self.tx.send(Request::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ActionRecord;
    use crate::storage::MemStore;
    use crate::storage::tier::StorageTier;

    fn mem_chain() -> (Arc<FallbackChain>, Arc<MemStore>) {
        let primary = Arc::new(MemStore::new());
        let tiers: Vec<Arc<dyn crate::storage::StorageTier>> = vec![primary.clone()];
        let chain = Arc::new(FallbackChain::new(tiers, Arc::new(MemStore::new())));
        (chain, primary)
    }

    #[test]
    fn test_schedule_then_flush_persists() {
        let (chain, primary) = mem_chain();
        let timeline = Arc::new(Mutex::new(vec![ActionRecord::open("A", "Pass", 100)]));
        let queue = PersistQueue::spawn(
            chain.clone(),
            timeline,
            Duration::from_millis(10),
            2,
            EventBus::new(),
        );

        queue.schedule("vid1");
        queue.flush();

        assert!(primary.try_read("vid1").unwrap().is_some());
        assert_eq!(chain.load_timeline_for_video("vid1").len(), 1);
    }

    #[test]
    fn test_rapid_schedules_coalesce() {
        let (chain, _) = mem_chain();
        let timeline = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        let queue = PersistQueue::spawn(
            chain,
            timeline,
            Duration::from_millis(200),
            2,
            bus.clone(),
        );

        queue.schedule("vid1");
        queue.schedule("vid1");
        queue.schedule("vid1");
        queue.flush();

        let saves = bus
            .poll()
            .into_iter()
            .filter(|e| matches!(e, TimelineEvent::TimelineSaved { .. }))
            .count();
        assert_eq!(saves, 1);
    }

    #[test]
    fn test_latest_video_id_wins() {
        let (chain, primary) = mem_chain();
        let timeline = Arc::new(Mutex::new(vec![ActionRecord::open("A", "Shot", 0)]));
        let queue = PersistQueue::spawn(
            chain,
            timeline,
            Duration::from_millis(200),
            2,
            EventBus::new(),
        );

        queue.schedule("old-video");
        queue.schedule("new-video");
        queue.flush();

        assert!(primary.try_read("old-video").unwrap().is_none());
        assert!(primary.try_read("new-video").unwrap().is_some());
    }
}
