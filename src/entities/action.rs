//! ActionRecord: one timed, labeled event tied to a team and an action type.
//!
//! Open/closed state is encoded by the presence of `end`: a record without an
//! end timestamp is still in progress. Every open/closed check in the crate
//! goes through [`ActionRecord::is_open`] - the distinction is never
//! re-derived elsewhere.
//!
//! **Used by**: tracker (lifecycle mutations), storage chain (serialization),
//! exporter (CSV / sheet rows).

use serde::{Deserialize, Serialize};

/// One tagged event on a video timeline.
///
/// Timestamps are integer milliseconds of video playback position, not
/// wall-clock time. `end < start` is legal: the user may seek backward
/// between starting and stopping an action, and the record keeps whatever
/// the playhead said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Owning team, non-empty (caller's responsibility)
    pub team: String,

    /// Action type label, non-empty (caller's responsibility)
    pub action: String,

    /// Playback position when the action was opened (ms)
    pub start: u64,

    /// Playback position when the action was closed (ms); None = still open
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub end: Option<u64>,

    /// Attached labels in insertion order. Duplicates allowed; composite
    /// "Category - Value" labels pass through as single tokens.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ActionRecord {
    /// Create a new open record stamped at `start` ms.
    pub fn open(team: impl Into<String>, action: impl Into<String>, start: u64) -> Self {
        Self {
            team: team.into(),
            action: action.into(),
            start,
            end: None,
            labels: Vec::new(),
        }
    }

    /// True while the record has no end timestamp.
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Exact (team, action) match used by stop/label lookups.
    pub fn matches(&self, team: &str, action: &str) -> bool {
        self.team == team && self.action == action
    }
}

/// Ordered sequence of all ActionRecords for one video.
pub type Timeline = Vec<ActionRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_then_close() {
        let mut rec = ActionRecord::open("TeamA", "Shoot", 1500);
        assert!(rec.is_open());

        rec.end = Some(3200);
        assert!(!rec.is_open());
        assert_eq!(rec.start, 1500);
    }

    #[test]
    fn test_serde_omits_end_while_open() {
        let rec = ActionRecord::open("TeamA", "Pass", 100);
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("\"end\""));

        let back: ActionRecord = serde_json::from_str(&json).unwrap();
        assert!(back.is_open());
        assert_eq!(back, rec);
    }

    #[test]
    fn test_deserialize_tolerates_missing_labels() {
        let json = r#"{"team":"A","action":"Pass","start":250}"#;
        let rec: ActionRecord = serde_json::from_str(json).unwrap();
        assert!(rec.labels.is_empty());
        assert!(rec.is_open());
    }

    #[test]
    fn test_label_order_round_trip() {
        let mut rec = ActionRecord::open("A", "Pass", 0);
        rec.labels.push("Good".to_string());
        rec.labels.push("Accurate".to_string());
        rec.labels.push("Good".to_string()); // duplicates are legal

        let json = serde_json::to_string(&rec).unwrap();
        let back: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.labels, vec!["Good", "Accurate", "Good"]);
    }
}
