//! Report assembly
//!
//! [`Analyzer`] runs every stage over a corpus and packages the results into
//! an [`AnalyticsReport`]. A report is never mutated after construction; the
//! views below return borrowed slices or fresh values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::clusters::{self, ClusterCollection};
use crate::config::AnalyticsConfig;
use crate::conversation::{corpus_from_value, Conversation};
use crate::frequency::{FrequencyAnalyzer, WordCloudData};
use crate::history::{load_history, HistoryEntry};
use crate::hourly::{HourlyActivitySummary, HourlyAnalyzer};
use crate::insights::{generate_insights, Importance, Insight, InsightInputs};
use crate::persona::{classify, ActivityPattern, DeveloperPersona, LearningPattern};
use crate::privacy::RedactionPolicy;
use crate::sentences::{SentenceCounter, SentencePatternSummary};
use crate::technology;
use crate::text;
use crate::timeline::{build_timeline, CorpusStatistics, Period, TimelineEntry};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCount {
  pub period: String,
  pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
  word_cloud: WordCloudData,
  technology_clusters: ClusterCollection,
  task_clusters: ClusterCollection,
  topic_clusters: ClusterCollection,
  timeline: Vec<TimelineEntry>,
  statistics: CorpusStatistics,
  insights: Vec<Insight>,
  persona: DeveloperPersona,
  #[serde(skip_serializing_if = "Option::is_none")]
  hourly_activity: Option<HourlyActivitySummary>,
  sentence_patterns: SentencePatternSummary,
}

impl AnalyticsReport {
  pub fn word_cloud(&self) -> &WordCloudData {
    &self.word_cloud
  }

  pub fn technology_clusters(&self) -> &ClusterCollection {
    &self.technology_clusters
  }

  pub fn task_clusters(&self) -> &ClusterCollection {
    &self.task_clusters
  }

  pub fn topic_clusters(&self) -> &ClusterCollection {
    &self.topic_clusters
  }

  pub fn timeline(&self) -> &[TimelineEntry] {
    &self.timeline
  }

  pub fn statistics(&self) -> &CorpusStatistics {
    &self.statistics
  }

  pub fn insights(&self) -> &[Insight] {
    &self.insights
  }

  pub fn persona(&self) -> &DeveloperPersona {
    &self.persona
  }

  /// `None` when neither the corpus nor the history log held any events
  pub fn hourly_activity(&self) -> Option<&HourlyActivitySummary> {
    self.hourly_activity.as_ref()
  }

  pub fn sentence_patterns(&self) -> &SentencePatternSummary {
    &self.sentence_patterns
  }

  pub fn insights_by_importance(&self, importance: Importance) -> Vec<&Insight> {
    self.insights.iter().filter(|insight| insight.importance == importance).collect()
  }

  /// Timeline entries dated within `[start, end]`
  pub fn timeline_between(&self, start: NaiveDate, end: NaiveDate) -> &[TimelineEntry] {
    let lo = self.timeline.partition_point(|entry| entry.date < start);
    let hi = self.timeline.partition_point(|entry| entry.date <= end);
    if lo >= hi {
      return &[];
    }
    &self.timeline[lo..hi]
  }

  /// Conversations mentioning each technology per period, zero-filled from the
  /// first to the last timeline date
  pub fn technology_evolution(&self, period: Period) -> BTreeMap<String, Vec<PeriodCount>> {
    let (Some(first), Some(last)) = (self.timeline.first(), self.timeline.last()) else {
      return BTreeMap::new();
    };

    let keys = period.keys_between(first.date, last.date);
    let slots: BTreeMap<&str, usize> = keys.iter().enumerate().map(|(slot, key)| (key.as_str(), slot)).collect();
    let mut series: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for entry in &self.timeline {
      let Some(&slot) = slots.get(period.key(entry.date).as_str()) else {
        continue;
      };
      for (name, count) in &entry.technologies {
        series.entry(name.clone()).or_insert_with(|| vec![0; keys.len()])[slot] += count;
      }
    }

    series
      .into_iter()
      .map(|(name, counts)| {
        let points = keys.iter().zip(counts).map(|(key, count)| PeriodCount { period: key.clone(), count }).collect();
        (name, points)
      })
      .collect()
  }

  /// Copy of the report with identifying values passed through `policy`
  pub fn shareable(&self, policy: &dyn RedactionPolicy) -> AnalyticsReport {
    let aliases = Aliases::collect(self, policy);
    let mut report = self.clone();

    for collection in [&mut report.technology_clusters, &mut report.task_clusters, &mut report.topic_clusters] {
      for cluster in &mut collection.clusters {
        for member in &mut cluster.member_conversations {
          member.project_name = aliases.project(&member.project_name);
          member.session_id = aliases.session(&member.session_id);
        }
      }
    }

    for entry in &mut report.timeline {
      entry.projects = entry.projects.iter().map(|project| aliases.project(project)).collect();
      entry.session_ids = entry.session_ids.iter().map(|id| aliases.session(id)).collect();
    }

    for phrase in &mut report.word_cloud.phrases {
      phrase.contexts = phrase.contexts.iter().map(|context| policy.redact_text(context)).collect();
    }

    for insight in &mut report.insights {
      insight.title = policy.redact_text(&insight.title);
      insight.description = policy.redact_text(&insight.description);
    }

    report
  }
}

/// Redacted form of every project name and session id, numbered in sorted order
struct Aliases {
  projects: BTreeMap<String, String>,
  sessions: BTreeMap<String, String>,
}

impl Aliases {
  fn collect(report: &AnalyticsReport, policy: &dyn RedactionPolicy) -> Self {
    let mut projects = BTreeSet::new();
    let mut sessions = BTreeSet::new();

    for collection in [&report.technology_clusters, &report.task_clusters, &report.topic_clusters] {
      for member in collection.clusters.iter().flat_map(|c| &c.member_conversations) {
        projects.insert(member.project_name.as_str());
        sessions.insert(member.session_id.as_str());
      }
    }
    for entry in &report.timeline {
      projects.extend(entry.projects.iter().map(String::as_str));
      sessions.extend(entry.session_ids.iter().map(String::as_str));
    }

    Self {
      projects: projects
        .into_iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), policy.redact_project(name, index + 1)))
        .collect(),
      sessions: sessions
        .into_iter()
        .enumerate()
        .map(|(index, id)| (id.to_string(), policy.redact_session(id, index + 1)))
        .collect(),
    }
  }

  fn project(&self, name: &str) -> String {
    self.projects.get(name).cloned().unwrap_or_else(|| name.to_string())
  }

  fn session(&self, id: &str) -> String {
    self.sessions.get(id).cloned().unwrap_or_else(|| id.to_string())
  }
}

/// Runs the full pipeline with one configuration
pub struct Analyzer {
  config: AnalyticsConfig,
  as_of: Option<DateTime<Utc>>,
}

impl Analyzer {
  pub fn new(config: AnalyticsConfig) -> Self {
    Self { config, as_of: None }
  }

  /// Anchor the history lookback window; defaults to the current time
  pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
    self.as_of = Some(as_of);
    self
  }

  pub fn config(&self) -> &AnalyticsConfig {
    &self.config
  }

  /// Analyze a corpus together with the configured history log.
  ///
  /// An unreadable history log is logged and treated as empty.
  pub fn analyze(&self, conversations: &[Conversation]) -> AnalyticsReport {
    let as_of = self.as_of.unwrap_or_else(Utc::now);
    let history = match load_history(&self.config.history, as_of) {
      Ok(history) => history,
      Err(e) => {
        tracing::warn!(error = %e, "Ignoring history log");
        Vec::new()
      }
    };
    self.analyze_with_history(conversations, &history)
  }

  /// Analyze a loosely typed corpus; fails only when `value` is not an array
  pub fn analyze_value(&self, value: Value) -> Result<AnalyticsReport> {
    let conversations = corpus_from_value(value)?;
    Ok(self.analyze(&conversations))
  }

  /// Analyze a corpus with history entries the caller already holds
  pub fn analyze_with_history(&self, conversations: &[Conversation], history: &[HistoryEntry]) -> AnalyticsReport {
    tracing::debug!(conversations = conversations.len(), history = history.len(), "Starting analysis");
    let clock = self.config.clock();

    let frequency = FrequencyAnalyzer::new(&self.config.text).analyze(conversations);
    let stacks = technology::detect_all(conversations);
    let technology_clusters = technology::cluster_technologies_with(conversations, &stacks);
    let task_clusters = clusters::cluster_task_types(conversations, &stacks);
    let topic_clusters =
      clusters::cluster_topics(conversations, &frequency, &stacks, self.config.max_topic_clusters);

    let hourly_activity = HourlyAnalyzer::new(clock).analyze(conversations, history);
    let timeline = build_timeline(conversations, &stacks, clock);
    let statistics = CorpusStatistics::compute(conversations, &frequency.word_cloud, clock);

    let mut sentences = SentenceCounter::new();
    for conversation in conversations {
      for span in text::extract(conversation) {
        sentences.observe(&span);
      }
    }
    let sentence_patterns = sentences.finish();

    let insights = generate_insights(&InsightInputs {
      statistics: &statistics,
      word_cloud: &frequency.word_cloud,
      technology: &technology_clusters,
      task_types: &task_clusters,
      topics: &topic_clusters,
      hourly: hourly_activity.as_ref(),
    });

    let streaks = hourly_activity.as_ref().map(|summary| summary.streaks).unwrap_or_default();
    let persona = classify(
      &ActivityPattern::from_summary(hourly_activity.as_ref()),
      &LearningPattern::new(technology_clusters.clusters.len(), conversations.len(), streaks.active_days),
      &streaks,
    );

    tracing::info!(
      conversations = conversations.len(),
      technology_clusters = technology_clusters.clusters.len(),
      persona = persona.kind.name(),
      "Analysis complete"
    );

    AnalyticsReport {
      word_cloud: frequency.word_cloud,
      technology_clusters,
      task_clusters,
      topic_clusters,
      timeline,
      statistics,
      insights,
      persona,
      hourly_activity,
      sentence_patterns,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::Clock;
  use crate::conversation::Message;
  use crate::privacy::PrivacySettings;
  use chrono::TimeZone;

  fn config() -> AnalyticsConfig {
    AnalyticsConfig { utc_offset_minutes: Some(0), ..Default::default() }
  }

  fn conversation(id: &str, project: &str, day: u32, text: &str) -> Conversation {
    let start = Utc.with_ymd_and_hms(2025, 3, day, 14, 0, 0).unwrap();
    Conversation::new(id, project, start, vec![Message::user(text, start), Message::assistant("Sure, here you go.", start)])
  }

  fn corpus() -> Vec<Conversation> {
    vec![
      conversation("s1", "api", 3, "How do I fix this rust borrow error in /home/ana/api/src/main.rs?"),
      conversation("s2", "api", 4, "Debug the rust lifetime error please."),
      conversation("s3", "web", 20, "Add a react component with useState."),
      conversation("s4", "web", 21, "The react build fails with an error."),
    ]
  }

  fn report() -> AnalyticsReport {
    Analyzer::new(config()).analyze_with_history(&corpus(), &[])
  }

  #[test]
  fn test_empty_corpus_report() {
    let report = Analyzer::new(config()).analyze_with_history(&[], &[]);

    assert!(report.word_cloud().is_empty());
    assert!(report.technology_clusters().is_empty());
    assert!(report.timeline().is_empty());
    assert!(report.hourly_activity().is_none());
    assert_eq!(report.statistics().total_conversations, 0);
    assert!(report.technology_evolution(Period::Week).is_empty());
  }

  #[test]
  fn test_report_sections() {
    let report = report();
    let labels: Vec<&str> = report.technology_clusters().clusters.iter().map(|c| c.label.as_str()).collect();

    assert_eq!(labels, vec!["Language: Rust", "Framework: React"]);
    assert_eq!(report.timeline().len(), 4);
    assert_eq!(report.hourly_activity().map(|h| h.total_events), Some(4));
    assert_eq!(report.statistics().unique_projects, 2);
    assert!(!report.insights_by_importance(Importance::High).is_empty());
  }

  #[test]
  fn test_sentence_patterns_cover_user_turns() {
    let corpus = corpus();
    let spans: Vec<_> = corpus.iter().flat_map(text::extract).collect();
    let patterns = report().sentence_patterns().clone();

    assert_eq!(patterns, crate::sentences::analyze_sentences(&spans));
    assert!(patterns.total_sentences >= 4);
    assert!(patterns.questions >= 1);
    // assistant replies never count
    assert!(patterns.top_openers.iter().all(|opener| opener.word != "sure"));
  }

  #[test]
  fn test_timeline_between() {
    let report = report();
    let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();

    assert_eq!(report.timeline_between(day(4), day(20)).len(), 2);
    assert_eq!(report.timeline_between(day(1), day(31)).len(), 4);
    assert!(report.timeline_between(day(21), day(3)).is_empty());
  }

  #[test]
  fn test_technology_evolution_is_zero_filled() {
    let evolution = report().technology_evolution(Period::Week);
    let rust = &evolution["Rust"];
    let react = &evolution["React"];

    // 2025-03-03 through 2025-03-21 spans ISO weeks 10 to 12
    assert_eq!(rust.iter().map(|p| p.period.as_str()).collect::<Vec<_>>(), vec!["2025-W10", "2025-W11", "2025-W12"]);
    assert_eq!(rust.iter().map(|p| p.count).collect::<Vec<_>>(), vec![2, 0, 0]);
    assert_eq!(react.iter().map(|p| p.count).collect::<Vec<_>>(), vec![0, 0, 2]);
  }

  #[test]
  fn test_shareable_redacts_identifiers() {
    let report = report();
    let shared = report.shareable(&PrivacySettings::strict());

    let members = &shared.technology_clusters().clusters[0].member_conversations;
    assert_eq!(members[0].project_name, "project-1");
    assert_eq!(members[0].session_id, "session-1");
    assert!(shared.timeline().iter().all(|e| e.projects.iter().all(|p| p.starts_with("project-"))));
    assert!(shared.word_cloud().phrases.iter().flat_map(|p| &p.contexts).all(|c| !c.contains("/home/")));

    // The original is untouched
    assert_eq!(report.technology_clusters().clusters[0].member_conversations[0].project_name, "api");
  }

  #[test]
  fn test_analyze_value_rejects_non_array() {
    let err = Analyzer::new(config()).analyze_value(serde_json::json!({"sessionId": "x"})).unwrap_err();
    assert!(err.to_string().contains("expected an array"));
  }

  #[test]
  fn test_clock_comes_from_config() {
    assert_eq!(config().clock(), Clock::utc());
  }
}
