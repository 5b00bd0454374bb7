//! TimelineSession: action lifecycle tracker for the active video.
//!
//! **Architecture**: an explicit context object - no module-level globals.
//! The session owns the in-memory timeline (the single source of truth while
//! a video is active) behind `Arc<Mutex<..>>` shared with the persist
//! worker; the mutex serializes mutations the way run-to-completion does in
//! a browser.
//!
//! Lifecycle rules:
//! - start always appends a new open record; duplicates for the same
//!   (team, action) are independent, never merged or rejected
//! - stop/label target the MOST RECENTLY ADDED open record with an exact
//!   (team, action) match; a miss is a logged no-op, never an error
//! - labels cannot attach to closed records through this interface
//! - `end < start` is kept as recorded (the user closed the action while
//!   the playhead was earlier)

use std::sync::{Arc, Mutex};

use log::{debug, warn};

use super::clock::{position_ms, VideoClock};
use super::event_bus::{EventBus, TimelineEvent};
use super::persist::PersistQueue;
use crate::entities::{ActionRecord, Timeline};
use crate::storage::FallbackChain;

/// Tracker for one tagging session.
pub struct TimelineSession {
    /// Active video id; None between videos
    video_id: Option<String>,
    /// In-memory timeline for the active video (shared with persist worker)
    timeline: Arc<Mutex<Timeline>>,
    /// Playback position source; None reads as position 0
    clock: Option<Arc<dyn VideoClock>>,
    chain: Arc<FallbackChain>,
    bus: EventBus,
    /// Debounced background saver; None = synchronous saves only
    persist: Option<Arc<PersistQueue>>,
    max_retries: usize,
}

impl TimelineSession {
    pub fn new(chain: Arc<FallbackChain>, bus: EventBus, max_retries: usize) -> Self {
        Self {
            video_id: None,
            timeline: Arc::new(Mutex::new(Vec::new())),
            clock: None,
            chain,
            bus,
            persist: None,
            max_retries,
        }
    }

    /// Attach the playback clock (the host video surface).
    pub fn set_clock(&mut self, clock: Arc<dyn VideoClock>) {
        self.clock = Some(clock);
    }

    /// Attach the background persist queue. Until attached, mutations only
    /// touch memory and `save()` is the way to storage.
    pub fn attach_persist(&mut self, persist: Arc<PersistQueue>) {
        self.persist = Some(persist);
    }

    /// Shared timeline handle for wiring the persist worker.
    pub fn timeline_handle(&self) -> Arc<Mutex<Timeline>> {
        Arc::clone(&self.timeline)
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    /// Make `video_id` the active video, replacing the in-memory timeline
    /// with whatever the storage chain holds for it.
    pub fn activate_video(&mut self, video_id: &str) {
        let loaded = self.chain.load_timeline_for_video(video_id);
        let count = loaded.len();
        *self.lock_timeline() = loaded;
        self.video_id = Some(video_id.to_string());
        debug!("Activated video {} ({} stored record(s))", video_id, count);
        self.bus.emit(TimelineEvent::TimelineLoaded {
            video_id: video_id.to_string(),
            count,
        });
    }

    /// Leave the current video: clears the in-memory view only, persistent
    /// storage keeps the timeline.
    pub fn deactivate(&mut self) {
        self.lock_timeline().clear();
        self.video_id = None;
    }

    /// Open a new action record stamped at the current playback position.
    pub fn start_action(&self, team: &str, action: &str) {
        let start = position_ms(self.clock.as_deref());
        self.lock_timeline().push(ActionRecord::open(team, action, start));
        debug!("Started {} / {} at {}ms", team, action, start);
        self.bus.emit(TimelineEvent::ActionStarted {
            team: team.to_string(),
            action: action.to_string(),
            start,
        });
        self.schedule_persist();
    }

    /// Close the most recently added open record matching (team, action).
    /// No open match: warning, no mutation.
    pub fn stop_action(&self, team: &str, action: &str) {
        let end = position_ms(self.clock.as_deref());
        {
            let mut timeline = self.lock_timeline();
            let Some(idx) = timeline
                .iter()
                .rposition(|r| r.is_open() && r.matches(team, action))
            else {
                warn!("No open action to stop for {} / {}", team, action);
                return;
            };
            timeline[idx].end = Some(end);
        }
        debug!("Stopped {} / {} at {}ms", team, action, end);
        self.bus.emit(TimelineEvent::ActionStopped {
            team: team.to_string(),
            action: action.to_string(),
            end,
        });
        self.schedule_persist();
    }

    /// Append `label` to the most recently added open (team, action) record.
    /// Duplicates are allowed; insertion order is preserved. No open match:
    /// warning, no mutation - closed records never gain labels here.
    pub fn add_label(&self, team: &str, action: &str, label: &str) {
        {
            let mut timeline = self.lock_timeline();
            let Some(idx) = timeline
                .iter()
                .rposition(|r| r.is_open() && r.matches(team, action))
            else {
                warn!("No open action to label for {} / {}", team, action);
                return;
            };
            timeline[idx].labels.push(label.to_string());
        }
        self.bus.emit(TimelineEvent::LabelAdded {
            team: team.to_string(),
            action: action.to_string(),
            label: label.to_string(),
        });
        self.schedule_persist();
    }

    /// Remove the record matching all three fields exactly. `start` is the
    /// disambiguator when several records share (team, action). Returns
    /// false without logging when nothing matches - callers decide what to
    /// do with their optimistic state.
    pub fn delete_action(&self, team: &str, action: &str, start: u64) -> bool {
        let removed = {
            let mut timeline = self.lock_timeline();
            match timeline
                .iter()
                .position(|r| r.matches(team, action) && r.start == start)
            {
                Some(idx) => {
                    timeline.remove(idx);
                    true
                }
                None => false,
            }
        };
        if removed {
            self.bus.emit(TimelineEvent::ActionDeleted {
                team: team.to_string(),
                action: action.to_string(),
                start,
            });
            self.schedule_persist();
        }
        removed
    }

    /// Snapshot of the current in-memory timeline.
    pub fn actions(&self) -> Timeline {
        self.lock_timeline().clone()
    }

    /// Synchronous save of the active video's timeline through the chain.
    /// False when no video is active.
    pub fn save(&self) -> bool {
        let Some(video_id) = self.video_id.as_deref() else {
            return false;
        };
        let snapshot = self.lock_timeline().clone();
        self.chain
            .save_timeline_for_video(video_id, &snapshot, self.max_retries)
    }

    fn schedule_persist(&self) {
        if let (Some(persist), Some(video_id)) = (&self.persist, &self.video_id) {
            persist.schedule(video_id);
        }
    }

    fn lock_timeline(&self) -> std::sync::MutexGuard<'_, Timeline> {
        self.timeline.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::storage::{MemStore, DEFAULT_MAX_RETRIES};

    fn session_with_clock() -> (TimelineSession, Arc<ManualClock>) {
        let tiers: Vec<Arc<dyn crate::storage::StorageTier>> = vec![Arc::new(MemStore::new())];
        let chain = Arc::new(FallbackChain::new(tiers, Arc::new(MemStore::new())));
        let mut session = TimelineSession::new(chain, EventBus::new(), DEFAULT_MAX_RETRIES);
        let clock = Arc::new(ManualClock::new());
        session.set_clock(clock.clone());
        (session, clock)
    }

    #[test]
    fn test_start_stop_example_scenario() {
        let (mut session, clock) = session_with_clock();
        session.activate_video("vid1");

        clock.set(1.5);
        session.start_action("TeamA", "Shoot");
        session.add_label("TeamA", "Shoot", "Good");
        clock.set(3.2);
        session.stop_action("TeamA", "Shoot");

        let actions = session.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].team, "TeamA");
        assert_eq!(actions[0].action, "Shoot");
        assert_eq!(actions[0].start, 1500);
        assert_eq!(actions[0].end, Some(3200));
        assert_eq!(actions[0].labels, vec!["Good"]);
    }

    #[test]
    fn test_double_start_creates_independent_records() {
        let (session, _clock) = session_with_clock();

        session.start_action("A", "Pass");
        session.start_action("A", "Pass");

        let actions = session.actions();
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|r| r.is_open()));
        assert!(actions.iter().all(|r| r.matches("A", "Pass")));
    }

    #[test]
    fn test_stop_closes_most_recent_open_match() {
        let (session, clock) = session_with_clock();

        clock.set(1.0);
        session.start_action("A", "Pass");
        clock.set(2.0);
        session.start_action("A", "Pass");
        clock.set(3.0);
        session.stop_action("A", "Pass");

        let actions = session.actions();
        // Older record still open, newer one closed
        assert!(actions[0].is_open());
        assert_eq!(actions[1].end, Some(3000));
    }

    #[test]
    fn test_stop_without_open_match_is_noop() {
        let (session, _clock) = session_with_clock();
        session.start_action("A", "Pass");

        let before = session.actions();
        session.stop_action("A", "Shot"); // different action
        session.stop_action("B", "Pass"); // different team
        assert_eq!(session.actions(), before);
    }

    #[test]
    fn test_label_order_preserved() {
        let (session, _clock) = session_with_clock();
        session.start_action("A", "Pass");
        session.add_label("A", "Pass", "Good");
        session.add_label("A", "Pass", "Accurate");

        assert_eq!(session.actions()[0].labels, vec!["Good", "Accurate"]);
    }

    #[test]
    fn test_label_after_close_is_rejected() {
        let (session, _clock) = session_with_clock();
        session.start_action("A", "Pass");
        session.stop_action("A", "Pass");
        session.add_label("A", "Pass", "TooLate");

        assert!(session.actions()[0].labels.is_empty());
    }

    #[test]
    fn test_delete_exact_triple_once() {
        let (session, clock) = session_with_clock();
        clock.set(1.0);
        session.start_action("A", "Pass");
        clock.set(2.0);
        session.start_action("A", "Pass");

        assert!(session.delete_action("A", "Pass", 1000));
        assert_eq!(session.actions().len(), 1);
        assert_eq!(session.actions()[0].start, 2000);

        // Same triple again: nothing left to delete
        assert!(!session.delete_action("A", "Pass", 1000));
        assert_eq!(session.actions().len(), 1);
    }

    #[test]
    fn test_end_before_start_passes_through() {
        let (session, clock) = session_with_clock();
        clock.set(10.0);
        session.start_action("A", "Pass");
        clock.set(4.0); // user seeked backward
        session.stop_action("A", "Pass");

        let rec = &session.actions()[0];
        assert_eq!(rec.start, 10000);
        assert_eq!(rec.end, Some(4000));
    }

    #[test]
    fn test_no_clock_stamps_zero() {
        let tiers: Vec<Arc<dyn crate::storage::StorageTier>> = vec![Arc::new(MemStore::new())];
        let chain = Arc::new(FallbackChain::new(tiers, Arc::new(MemStore::new())));
        let session = TimelineSession::new(chain, EventBus::new(), DEFAULT_MAX_RETRIES);
        session.start_action("A", "Pass");
        assert_eq!(session.actions()[0].start, 0);
    }

    #[test]
    fn test_activate_save_deactivate_round_trip() {
        let (mut session, clock) = session_with_clock();
        session.activate_video("vid1");
        clock.set(1.5);
        session.start_action("A", "Shot");
        session.stop_action("A", "Shot");
        assert!(session.save());

        // Navigating away clears memory, not storage
        session.deactivate();
        assert!(session.actions().is_empty());
        assert!(session.video_id().is_none());

        session.activate_video("vid1");
        let actions = session.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].start, 1500);
    }
}
