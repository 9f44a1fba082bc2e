//! Hour-of-day and day-of-week activity profile
//!
//! Conversation start times and history log entries are merged into one event
//! stream and bucketed on the configured [`Clock`]. No events means no
//! summary: [`HourlyAnalyzer::analyze`] returns `None` instead of a zeroed
//! stub.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::clock::Clock;
use crate::conversation::Conversation;
use crate::history::HistoryEntry;

pub const WEEKDAYS: [Weekday; 7] =
  [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
  History,
  Conversation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
  pub timestamp: DateTime<Utc>,
  pub source: EventSource,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyBucket {
  pub hour: u32,
  pub count: usize,
  pub label: String,
}

impl HourlyBucket {
  fn new(hour: usize, count: usize) -> Self {
    Self { hour: hour as u32, count, label: format!("{hour:02}:00") }
  }
}

/// Longest contiguous run of hours at or above the hourly average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusWindow {
  pub start_hour: u32,
  /// Inclusive
  pub end_hour: u32,
  pub span_hours: u32,
  pub average_count: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBreakdown {
  pub history: usize,
  pub conversation: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStats {
  pub active_days: usize,
  /// Longest run of consecutive active calendar days
  pub longest_streak: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
  Positive,
  Neutral,
  Caution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
  pub id: String,
  pub tone: Tone,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyActivitySummary {
  pub total_events: usize,
  pub buckets: Vec<HourlyBucket>,
  /// Rows are weekdays from Monday, columns are hours
  pub weekday_matrix: [[usize; 24]; 7],
  pub peak_hour: HourlyBucket,
  pub quiet_hour: HourlyBucket,
  pub focus_window: FocusWindow,
  /// Share of events in [22:00, 06:00)
  pub night_share: f64,
  pub weekend_share: f64,
  /// Share of events in [05:00, 09:00)
  pub early_share: f64,
  pub dominant_day: Weekday,
  pub source_breakdown: SourceBreakdown,
  pub streaks: StreakStats,
  pub recommendations: Vec<Recommendation>,
}

impl HourlyActivitySummary {
  pub fn weekday_totals(&self) -> [usize; 7] {
    let mut totals = [0; 7];
    for (day, row) in self.weekday_matrix.iter().enumerate() {
      totals[day] = row.iter().sum();
    }
    totals
  }
}

/// A recommendation emitted when `applies` holds for a summary
pub struct RecommendationRule {
  pub id: &'static str,
  pub tone: Tone,
  pub applies: fn(&HourlyActivitySummary) -> bool,
  pub message: fn(&HourlyActivitySummary) -> String,
}

fn percent(share: f64) -> String {
  format!("{:.0}%", share * 100.0)
}

pub const RECOMMENDATION_RULES: &[RecommendationRule] = &[
  RecommendationRule {
    id: "late-nights",
    tone: Tone::Caution,
    applies: |s| s.night_share >= 0.3,
    message: |s| {
      format!(
        "{} of sessions happen between 22:00 and 06:00. Consider moving demanding work into daylight hours.",
        percent(s.night_share)
      )
    },
  },
  RecommendationRule {
    id: "weekend-load",
    tone: Tone::Caution,
    applies: |s| s.weekend_share >= 0.4,
    message: |s| format!("{} of activity falls on weekends. Protect some days for rest.", percent(s.weekend_share)),
  },
  RecommendationRule {
    id: "early-start",
    tone: Tone::Positive,
    applies: |s| s.early_share >= 0.25,
    message: |s| format!("{} of sessions start before 09:00. Early hours suit planning work.", percent(s.early_share)),
  },
  RecommendationRule {
    id: "focus-block",
    tone: Tone::Positive,
    applies: |s| s.focus_window.span_hours >= 4,
    message: |s| {
      format!(
        "You sustain a {}-hour focus block from {:02}:00 to {:02}:59.",
        s.focus_window.span_hours, s.focus_window.start_hour, s.focus_window.end_hour
      )
    },
  },
  RecommendationRule {
    id: "fragmented-focus",
    tone: Tone::Neutral,
    applies: |s| s.focus_window.span_hours <= 2 && s.total_events >= 24,
    message: |s| format!("Activity is spread thin. Try blocking out time around {}.", s.peak_hour.label),
  },
  RecommendationRule {
    id: "steady-streak",
    tone: Tone::Positive,
    applies: |s| s.streaks.longest_streak >= 5,
    message: |s| format!("Longest streak: {} consecutive active days.", s.streaks.longest_streak),
  },
  RecommendationRule {
    id: "peak-hour",
    tone: Tone::Neutral,
    applies: |_| true,
    message: |s| format!("Most active at {}. Schedule the hardest problems there.", s.peak_hour.label),
  },
];

pub fn recommend(summary: &HourlyActivitySummary) -> Vec<Recommendation> {
  RECOMMENDATION_RULES
    .iter()
    .filter(|rule| (rule.applies)(summary))
    .map(|rule| Recommendation { id: rule.id.to_string(), tone: rule.tone, message: (rule.message)(summary) })
    .collect()
}

/// Merge both event streams ordered by time; history precedes conversations at equal instants
pub fn collect_events(conversations: &[Conversation], history: &[HistoryEntry]) -> Vec<ActivityEvent> {
  let mut events: Vec<ActivityEvent> = history
    .iter()
    .filter_map(|entry| {
      let timestamp = entry.datetime()?;
      Some(ActivityEvent { timestamp, source: EventSource::History, project: entry.project.clone() })
    })
    .chain(conversations.iter().map(|c| ActivityEvent {
      timestamp: c.start_time,
      source: EventSource::Conversation,
      project: Some(c.project_name.clone()),
    }))
    .collect();

  events.sort_by_key(|event| event.timestamp);
  events
}

fn is_night(hour: usize) -> bool {
  hour >= 22 || hour < 6
}

fn is_early(hour: usize) -> bool {
  (5..9).contains(&hour)
}

fn share(part: usize, total: usize) -> f64 {
  if total == 0 {
    0.0
  } else {
    part as f64 / total as f64
  }
}

fn streaks(days: &BTreeSet<NaiveDate>) -> StreakStats {
  let mut longest = 0;
  let mut current = 0;
  let mut previous: Option<NaiveDate> = None;

  for &day in days {
    current = match previous.and_then(|p| p.succ_opt()) {
      Some(next) if next == day => current + 1,
      _ => 1,
    };
    longest = longest.max(current);
    previous = Some(day);
  }

  StreakStats { active_days: days.len(), longest_streak: longest }
}

/// Longest run with `count * 24 >= total`; the earliest run wins a tie
fn focus_window(counts: &[usize; 24], total: usize) -> FocusWindow {
  let mut best: Option<(usize, usize)> = None;
  let mut run_start: Option<usize> = None;

  for hour in 0..=24 {
    let above = hour < 24 && counts[hour] * 24 >= total;
    match (above, run_start) {
      (true, None) => run_start = Some(hour),
      (false, Some(start)) => {
        let len = hour - start;
        if best.map_or(true, |(_, best_len)| len > best_len) {
          best = Some((start, len));
        }
        run_start = None;
      }
      _ => {}
    }
  }

  let (start, len) = best.unwrap_or((0, 1));
  let window_total: usize = counts[start..start + len].iter().sum();
  FocusWindow {
    start_hour: start as u32,
    end_hour: (start + len - 1) as u32,
    span_hours: len as u32,
    average_count: window_total as f64 / len as f64,
  }
}

pub struct HourlyAnalyzer {
  clock: Clock,
}

impl HourlyAnalyzer {
  pub fn new(clock: Clock) -> Self {
    Self { clock }
  }

  pub fn analyze(&self, conversations: &[Conversation], history: &[HistoryEntry]) -> Option<HourlyActivitySummary> {
    let events = collect_events(conversations, history);
    if events.is_empty() {
      tracing::debug!("No activity events, skipping hourly analysis");
      return None;
    }

    let total = events.len();
    let mut hours = [0usize; 24];
    let mut matrix = [[0usize; 24]; 7];
    let mut days = BTreeSet::new();
    let mut sources = SourceBreakdown::default();
    let (mut night, mut early, mut weekend) = (0, 0, 0);

    for event in &events {
      let local = self.clock.localize(event.timestamp);
      let hour = local.hour() as usize;
      let weekday = local.weekday();

      hours[hour] += 1;
      matrix[weekday.num_days_from_monday() as usize][hour] += 1;
      days.insert(local.date());

      if is_night(hour) {
        night += 1;
      }
      if is_early(hour) {
        early += 1;
      }
      if matches!(weekday, Weekday::Sat | Weekday::Sun) {
        weekend += 1;
      }
      match event.source {
        EventSource::History => sources.history += 1,
        EventSource::Conversation => sources.conversation += 1,
      }
    }

    let buckets: Vec<HourlyBucket> = hours.iter().enumerate().map(|(hour, &count)| HourlyBucket::new(hour, count)).collect();

    // Strict comparisons keep the earliest hour on ties
    let mut peak = 0;
    let mut quiet = 0;
    for hour in 1..24 {
      if hours[hour] > hours[peak] {
        peak = hour;
      }
      if hours[hour] < hours[quiet] {
        quiet = hour;
      }
    }

    let mut summary = HourlyActivitySummary {
      total_events: total,
      peak_hour: buckets[peak].clone(),
      quiet_hour: buckets[quiet].clone(),
      buckets,
      weekday_matrix: matrix,
      focus_window: focus_window(&hours, total),
      night_share: share(night, total),
      weekend_share: share(weekend, total),
      early_share: share(early, total),
      dominant_day: Weekday::Mon,
      source_breakdown: sources,
      streaks: streaks(&days),
      recommendations: Vec::new(),
    };

    let totals = summary.weekday_totals();
    let mut dominant = 0;
    for day in 1..7 {
      if totals[day] > totals[dominant] {
        dominant = day;
      }
    }
    summary.dominant_day = WEEKDAYS[dominant];
    summary.recommendations = recommend(&summary);

    tracing::debug!(events = total, peak_hour = peak, "Hourly analysis complete");
    Some(summary)
  }
}
