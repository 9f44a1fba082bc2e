//! Reader for the append-only `history.jsonl` event log
//!
//! One JSON object per line. Lines that do not parse are skipped with a
//! warning; a missing log simply contributes no events.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::config::HistoryConfig;
use crate::{AnalyticsError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  /// Milliseconds since the Unix epoch
  pub timestamp: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub project: Option<String>,
}

impl HistoryEntry {
  pub fn new(timestamp: DateTime<Utc>) -> Self {
    Self { timestamp: timestamp.timestamp_millis(), display: None, project: None }
  }

  pub fn datetime(&self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(self.timestamp)
  }
}

/// Parse every well-formed line; blank and malformed lines are skipped
pub fn parse_history<R: BufRead>(reader: R) -> Vec<HistoryEntry> {
  let mut entries = Vec::new();

  for (line_num, line) in reader.lines().enumerate() {
    let line = match line {
      Ok(line) => line,
      Err(e) => {
        tracing::warn!(line = line_num + 1, error = %e, "Skipping unreadable history line");
        continue;
      }
    };

    if line.trim().is_empty() {
      continue;
    }

    match serde_json::from_str::<HistoryEntry>(&line) {
      Ok(entry) => entries.push(entry),
      Err(e) => tracing::warn!(line = line_num + 1, error = %e, "Skipping malformed history line"),
    }
  }

  entries
}

/// Keep entries inside the lookback window, oldest first, capped to the most recent `max_records`.
///
/// A lookback of zero days disables the window, as does one reaching past the
/// earliest representable date.
pub fn select_window(
  mut entries: Vec<HistoryEntry>,
  lookback_days: u32,
  max_records: Option<usize>,
  as_of: DateTime<Utc>,
) -> Vec<HistoryEntry> {
  if let Some(cutoff) = lookback_cutoff(lookback_days, as_of) {
    let cutoff = cutoff.timestamp_millis();
    entries.retain(|entry| entry.timestamp >= cutoff);
  }

  entries.sort_by_key(|entry| entry.timestamp);

  if let Some(max) = max_records {
    if entries.len() > max {
      entries.drain(..entries.len() - max);
    }
  }

  entries
}

fn lookback_cutoff(lookback_days: u32, as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
  if lookback_days == 0 {
    return None;
  }
  let cutoff = Duration::try_days(i64::from(lookback_days)).and_then(|span| as_of.checked_sub_signed(span));
  if cutoff.is_none() {
    tracing::debug!(lookback_days, "Lookback reaches past the calendar, keeping all history");
  }
  cutoff
}

/// Load the configured history log relative to `as_of`
pub fn load_history(config: &HistoryConfig, as_of: DateTime<Utc>) -> Result<Vec<HistoryEntry>> {
  let Some(path) = config.log_path() else {
    tracing::debug!("No home directory, skipping history log");
    return Ok(Vec::new());
  };

  if !path.exists() {
    tracing::debug!(path = %path.display(), "History log not found");
    return Ok(Vec::new());
  }

  let file = File::open(&path).map_err(|e| AnalyticsError::history_read(&path, e))?;
  let entries = parse_history(BufReader::new(file));
  let selected = select_window(entries, config.lookback_days, config.max_records, as_of);

  tracing::debug!(path = %path.display(), entries = selected.len(), "Loaded history log");
  Ok(selected)
}
