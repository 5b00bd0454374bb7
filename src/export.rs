//! Timeline exporters: CSV file sink and spreadsheet row formatting.
//!
//! The CSV transform is pure and synchronous. Fields are NOT quoted - this
//! reproduces the format tagging consumers already parse: composite
//! "Category - Value" labels pass through unchanged, and the Labels column
//! joins with ", ". Timestamps render as ISO-8601 instants with millisecond
//! precision relative to the epoch (playback position, not wall-clock).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;

use crate::entities::ActionRecord;

/// Column order of both the CSV and the sheet rows.
pub const CSV_HEADER: &str = "Team,Action,Start,End,Labels";

/// Render a playback position (ms) as an ISO-8601 instant,
/// e.g. 1500 -> "1970-01-01T00:00:01.500Z".
fn iso_ms(ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// One unquoted CSV row for a record. End is empty while the action is open.
fn csv_row(rec: &ActionRecord) -> String {
    format!(
        "{},{},{},{},{}",
        rec.team,
        rec.action,
        iso_ms(rec.start),
        rec.end.map(iso_ms).unwrap_or_default(),
        rec.labels.join(", ")
    )
}

/// Pure transform: header plus one row per record, newline-terminated.
pub fn actions_to_csv(actions: &[ActionRecord]) -> String {
    let mut out = String::with_capacity(64 * (actions.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for rec in actions {
        out.push_str(&csv_row(rec));
        out.push('\n');
    }
    out
}

/// Write the CSV to `path` (the downloadable-file sink).
pub fn write_csv(actions: &[ActionRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, actions_to_csv(actions))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Exported {} record(s) to {}", actions.len(), path.display());
    Ok(())
}

/// Pre-formatted 2-D rows for the spreadsheet sink, same columns and
/// rendering as the CSV (no header row).
pub fn sheet_rows(actions: &[ActionRecord]) -> Vec<Vec<String>> {
    actions
        .iter()
        .map(|rec| {
            vec![
                rec.team.clone(),
                rec.action.clone(),
                iso_ms(rec.start),
                rec.end.map(iso_ms).unwrap_or_default(),
                rec.labels.join(", "),
            ]
        })
        .collect()
}

/// Narrow interface to the external spreadsheet collaborator. The engine
/// only ever hands it pre-formatted rows; auth and transport live outside
/// this crate.
pub trait SheetSink {
    fn append_rows(&mut self, sheet_id: &str, range: &str, rows: &[Vec<String>]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_rendering() {
        assert_eq!(iso_ms(1500), "1970-01-01T00:00:01.500Z");
        assert_eq!(iso_ms(0), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_open_action_has_empty_end_field() {
        let mut rec = ActionRecord::open("TeamA", "Shoot", 1500);
        rec.labels.push("Good".to_string());
        rec.labels.push("Far - Left".to_string());

        let csv = actions_to_csv(&[rec]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Team,Action,Start,End,Labels"));
        assert_eq!(
            lines.next(),
            Some("TeamA,Shoot,1970-01-01T00:00:01.500Z,,Good, Far - Left")
        );
    }

    #[test]
    fn test_closed_action_renders_end() {
        let mut rec = ActionRecord::open("TeamA", "Shoot", 1500);
        rec.end = Some(3200);

        let csv = actions_to_csv(&[rec]);
        assert!(csv.contains("TeamA,Shoot,1970-01-01T00:00:01.500Z,1970-01-01T00:00:03.200Z,"));
    }

    #[test]
    fn test_sheet_rows_mirror_csv_columns() {
        let mut rec = ActionRecord::open("A", "Pass", 100);
        rec.labels.push("Good".to_string());

        let rows = sheet_rows(&[rec]);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            vec!["A", "Pass", "1970-01-01T00:00:00.100Z", "", "Good"]
        );
    }
}
