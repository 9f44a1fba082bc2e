//! Per-day timeline and corpus-wide statistics

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::clock::Clock;
use crate::conversation::{Conversation, Role};
use crate::frequency::WordCloudData;
use crate::technology::TechStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
  Day,
  Week,
  Month,
}

impl Period {
  /// `2025-03-14`, ISO week `2025-W11`, or `2025-03`
  pub fn key(&self, date: NaiveDate) -> String {
    match self {
      Period::Day => date.format("%Y-%m-%d").to_string(),
      Period::Week => {
        let week = date.iso_week();
        format!("{}-W{:02}", week.year(), week.week())
      }
      Period::Month => date.format("%Y-%m").to_string(),
    }
  }

  /// Every period key from `start` through `end`, ascending and without gaps
  pub fn keys_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for date in start.iter_days().take_while(|date| *date <= end) {
      let key = self.key(date);
      if keys.last() != Some(&key) {
        keys.push(key);
      }
    }
    keys
  }
}

impl std::str::FromStr for Period {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "day" => Ok(Period::Day),
      "week" => Ok(Period::Week),
      "month" => Ok(Period::Month),
      other => Err(format!("unknown period '{other}', expected day, week or month")),
    }
  }
}

/// Activity of one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
  pub date: NaiveDate,
  pub conversation_count: usize,
  pub message_count: usize,
  pub session_ids: Vec<String>,
  pub projects: BTreeSet<String>,
  /// Conversations mentioning each technology that day
  pub technologies: BTreeMap<String, usize>,
}

impl TimelineEntry {
  fn new(date: NaiveDate) -> Self {
    Self {
      date,
      conversation_count: 0,
      message_count: 0,
      session_ids: Vec::new(),
      projects: BTreeSet::new(),
      technologies: BTreeMap::new(),
    }
  }
}

/// One entry per day with at least one conversation, ascending by date.
///
/// `stacks` is index-aligned with `conversations`.
pub fn build_timeline(conversations: &[Conversation], stacks: &[TechStack], clock: Clock) -> Vec<TimelineEntry> {
  let mut days: BTreeMap<NaiveDate, TimelineEntry> = BTreeMap::new();

  for (index, conversation) in conversations.iter().enumerate() {
    let date = clock.localize(conversation.start_time).date();
    let entry = days.entry(date).or_insert_with(|| TimelineEntry::new(date));

    entry.conversation_count += 1;
    entry.message_count += conversation.message_count;
    entry.session_ids.push(conversation.session_id.clone());
    entry.projects.insert(conversation.project_name.clone());

    if let Some(stack) = stacks.get(index) {
      for name in stack.all() {
        *entry.technologies.entry(name.clone()).or_insert(0) += 1;
      }
    }
  }

  days.into_values().collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStatistics {
  pub total_conversations: usize,
  pub total_messages: usize,
  pub user_messages: usize,
  pub assistant_messages: usize,
  pub tool_invocations: usize,
  pub total_words: usize,
  pub conversations_with_code: usize,
  pub conversations_with_tools: usize,
  pub unique_projects: usize,
  pub average_messages_per_conversation: f64,
  pub first_activity: Option<DateTime<Utc>>,
  pub last_activity: Option<DateTime<Utc>>,
  pub active_days: usize,
  pub total_tokens: usize,
  pub unique_tokens: usize,
  pub vocabulary_richness: f64,
}

impl CorpusStatistics {
  pub fn compute(conversations: &[Conversation], word_cloud: &WordCloudData, clock: Clock) -> Self {
    let mut stats = CorpusStatistics {
      total_conversations: conversations.len(),
      total_tokens: word_cloud.total_tokens,
      unique_tokens: word_cloud.unique_tokens,
      vocabulary_richness: word_cloud.vocabulary_richness(),
      ..Default::default()
    };

    let mut projects = BTreeSet::new();
    let mut days = BTreeSet::new();

    for conversation in conversations {
      stats.total_messages += conversation.message_count;
      stats.total_words += conversation.word_count;
      stats.tool_invocations += conversation.tool_invocation_count();
      for message in &conversation.messages {
        match message.role() {
          Role::User => stats.user_messages += 1,
          Role::Assistant => stats.assistant_messages += 1,
        }
      }
      if conversation.has_code {
        stats.conversations_with_code += 1;
      }
      if conversation.uses_tools {
        stats.conversations_with_tools += 1;
      }

      projects.insert(conversation.project_name.as_str());
      days.insert(clock.localize(conversation.start_time).date());

      let end = conversation.end_time.unwrap_or(conversation.start_time).max(conversation.start_time);
      stats.first_activity = Some(stats.first_activity.map_or(conversation.start_time, |t| t.min(conversation.start_time)));
      stats.last_activity = Some(stats.last_activity.map_or(end, |t| t.max(end)));
    }

    stats.unique_projects = projects.len();
    stats.active_days = days.len();
    if stats.total_conversations > 0 {
      stats.average_messages_per_conversation = stats.total_messages as f64 / stats.total_conversations as f64;
    }

    stats
  }

  pub fn code_ratio(&self) -> f64 {
    ratio(self.conversations_with_code, self.total_conversations)
  }

  pub fn tool_ratio(&self) -> f64 {
    ratio(self.conversations_with_tools, self.total_conversations)
  }
}

fn ratio(part: usize, total: usize) -> f64 {
  if total == 0 {
    0.0
  } else {
    part as f64 / total as f64
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::conversation::Message;
  use crate::technology::detect_all;
  use chrono::TimeZone;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn conversation(id: &str, project: &str, day: u32, text: &str) -> Conversation {
    let start = Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap();
    Conversation::new(id, project, start, vec![Message::user(text, start), Message::assistant("ok", start)])
  }

  #[test]
  fn test_period_keys() {
    let day = date(2025, 3, 14);
    assert_eq!(Period::Day.key(day), "2025-03-14");
    assert_eq!(Period::Week.key(day), "2025-W11");
    assert_eq!(Period::Month.key(day), "2025-03");
    assert_eq!(Period::Week.key(date(2024, 12, 30)), "2025-W01");
  }

  #[test]
  fn test_keys_between_fills_gaps() {
    let keys = Period::Month.keys_between(date(2025, 1, 20), date(2025, 4, 2));
    assert_eq!(keys, vec!["2025-01", "2025-02", "2025-03", "2025-04"]);
    assert!(Period::Day.keys_between(date(2025, 2, 1), date(2025, 1, 1)).is_empty());
  }

  #[test]
  fn test_period_from_str() {
    assert_eq!("Week".parse::<Period>(), Ok(Period::Week));
    assert!("year".parse::<Period>().is_err());
  }

  #[test]
  fn test_timeline_groups_by_day() {
    let conversations = vec![
      conversation("a", "api", 12, "rust question"),
      conversation("b", "web", 10, "react question"),
      conversation("c", "api", 12, "more rust and docker"),
    ];
    let stacks = detect_all(&conversations);
    let timeline = build_timeline(&conversations, &stacks, Clock::utc());

    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].date, date(2025, 3, 10));
    assert_eq!(timeline[1].conversation_count, 2);
    assert_eq!(timeline[1].message_count, 4);
    assert_eq!(timeline[1].session_ids, vec!["a", "c"]);
    assert_eq!(timeline[1].technologies.get("Rust"), Some(&2));
    assert_eq!(timeline[1].technologies.get("Docker"), Some(&1));
  }

  #[test]
  fn test_statistics() {
    let conversations = vec![
      conversation("a", "api", 12, "here is code ```fn main() {}```"),
      conversation("b", "web", 10, "plain text"),
    ];
    let stats = CorpusStatistics::compute(&conversations, &WordCloudData::default(), Clock::utc());

    assert_eq!(stats.total_conversations, 2);
    assert_eq!(stats.total_messages, 4);
    assert_eq!(stats.user_messages, 2);
    assert_eq!(stats.assistant_messages, 2);
    assert_eq!(stats.conversations_with_code, 1);
    assert_eq!(stats.unique_projects, 2);
    assert_eq!(stats.active_days, 2);
    assert_eq!(stats.average_messages_per_conversation, 2.0);
    assert_eq!(stats.first_activity, Some(Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap()));
    assert_eq!(stats.code_ratio(), 0.5);
  }

  #[test]
  fn test_empty_statistics() {
    let stats = CorpusStatistics::compute(&[], &WordCloudData::default(), Clock::utc());
    assert_eq!(stats, CorpusStatistics::default());
  }
}
