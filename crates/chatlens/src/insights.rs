//! Human-readable insights derived from the other analysis stages

use serde::{Deserialize, Serialize};

use crate::clusters::ClusterCollection;
use crate::frequency::WordCloudData;
use crate::hourly::HourlyActivitySummary;
use crate::timeline::CorpusStatistics;

/// Ordered from most to least important
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
  High,
  Medium,
  Low,
}

impl std::str::FromStr for Importance {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "high" => Ok(Importance::High),
      "medium" => Ok(Importance::Medium),
      "low" => Ok(Importance::Low),
      other => Err(format!("unknown importance '{other}', expected high, medium or low")),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
  Technology,
  Workflow,
  Habits,
  Vocabulary,
  Productivity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
  pub id: String,
  pub title: String,
  pub description: String,
  pub importance: Importance,
  pub category: InsightCategory,
}

/// Stage outputs an insight rule may read
pub struct InsightInputs<'a> {
  pub statistics: &'a CorpusStatistics,
  pub word_cloud: &'a WordCloudData,
  pub technology: &'a ClusterCollection,
  pub task_types: &'a ClusterCollection,
  pub topics: &'a ClusterCollection,
  pub hourly: Option<&'a HourlyActivitySummary>,
}

pub struct InsightRule {
  pub id: &'static str,
  pub importance: Importance,
  pub category: InsightCategory,
  /// Title and description when the rule fires
  pub evaluate: fn(&InsightInputs) -> Option<(String, String)>,
}

fn percent(share: f64) -> String {
  format!("{:.0}%", share * 100.0)
}

fn strip_prefix(label: &str) -> &str {
  label.split_once(": ").map_or(label, |(_, name)| name)
}

pub static INSIGHT_RULES: &[InsightRule] = &[
  InsightRule {
    id: "primary-technology",
    importance: Importance::High,
    category: InsightCategory::Technology,
    evaluate: |i| {
      let cluster = i.technology.largest()?;
      Some((
        format!("Most discussed technology: {}", strip_prefix(&cluster.label)),
        format!("{} of {} conversations involve {}.", cluster.size(), i.technology.total_conversations, strip_prefix(&cluster.label)),
      ))
    },
  },
  InsightRule {
    id: "dominant-task",
    importance: Importance::High,
    category: InsightCategory::Workflow,
    evaluate: |i| {
      let cluster = i.task_types.largest()?;
      Some((
        format!("Most common task: {}", strip_prefix(&cluster.label)),
        format!("{} conversations are about {}.", cluster.size(), strip_prefix(&cluster.label).to_lowercase()),
      ))
    },
  },
  InsightRule {
    id: "late-night-work",
    importance: Importance::High,
    category: InsightCategory::Habits,
    evaluate: |i| {
      let hourly = i.hourly.filter(|h| h.night_share >= 0.3)?;
      Some((
        "Frequent late-night sessions".to_string(),
        format!("{} of activity happens between 22:00 and 06:00.", percent(hourly.night_share)),
      ))
    },
  },
  InsightRule {
    id: "broad-stack",
    importance: Importance::Medium,
    category: InsightCategory::Technology,
    evaluate: |i| {
      let count = i.technology.clusters.len();
      (count >= 5).then(|| ("Broad technology range".to_string(), format!("Recurring work spans {count} technologies.")))
    },
  },
  InsightRule {
    id: "peak-hour",
    importance: Importance::Medium,
    category: InsightCategory::Habits,
    evaluate: |i| {
      let hourly = i.hourly?;
      Some((
        format!("Peak activity at {}", hourly.peak_hour.label),
        format!(
          "{} of {} events fall in that hour; the longest focus window runs {:02}:00 to {:02}:59.",
          hourly.peak_hour.count, hourly.total_events, hourly.focus_window.start_hour, hourly.focus_window.end_hour
        ),
      ))
    },
  },
  InsightRule {
    id: "tool-heavy",
    importance: Importance::Medium,
    category: InsightCategory::Workflow,
    evaluate: |i| {
      let ratio = i.statistics.tool_ratio();
      (ratio >= 0.5).then(|| {
        (
          "Agentic workflow".to_string(),
          format!("{} of conversations use tools ({} invocations).", percent(ratio), i.statistics.tool_invocations),
        )
      })
    },
  },
  InsightRule {
    id: "code-heavy",
    importance: Importance::Medium,
    category: InsightCategory::Productivity,
    evaluate: |i| {
      let ratio = i.statistics.code_ratio();
      (ratio >= 0.5).then(|| ("Code-centric conversations".to_string(), format!("{} of conversations contain code blocks.", percent(ratio))))
    },
  },
  InsightRule {
    id: "recurring-topic",
    importance: Importance::Low,
    category: InsightCategory::Vocabulary,
    evaluate: |i| {
      let cluster = i.topics.largest()?;
      Some((
        format!("Recurring topic: {}", strip_prefix(&cluster.label)),
        format!("The term comes up in {} conversations.", cluster.size()),
      ))
    },
  },
  InsightRule {
    id: "signature-term",
    importance: Importance::Low,
    category: InsightCategory::Vocabulary,
    evaluate: |i| {
      let word = i.word_cloud.words.first()?;
      Some((
        format!("Signature term: {}", word.text),
        format!("Used {} times with a TF-IDF weight of {:.2}.", word.raw_value, word.tfidf_weight),
      ))
    },
  },
  InsightRule {
    id: "long-conversations",
    importance: Importance::Low,
    category: InsightCategory::Productivity,
    evaluate: |i| {
      let average = i.statistics.average_messages_per_conversation;
      (average >= 20.0).then(|| ("Long conversations".to_string(), format!("Conversations average {average:.1} messages.")))
    },
  },
];

/// Every firing rule, ordered by importance then id
pub fn generate_insights(inputs: &InsightInputs) -> Vec<Insight> {
  let mut insights: Vec<Insight> = INSIGHT_RULES
    .iter()
    .filter_map(|rule| {
      let (title, description) = (rule.evaluate)(inputs)?;
      Some(Insight { id: rule.id.to_string(), title, description, importance: rule.importance, category: rule.category })
    })
    .collect();

  insights.sort_by(|a, b| a.importance.cmp(&b.importance).then_with(|| a.id.cmp(&b.id)));
  tracing::debug!(insights = insights.len(), "Insights generated");
  insights
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clusters::{ClusterMember, SemanticCluster};
  use crate::technology::TechStack;
  use chrono::{TimeZone, Utc};

  fn cluster(label: &str, members: usize) -> SemanticCluster {
    let timestamp = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    SemanticCluster {
      id: label.to_lowercase(),
      label: label.to_string(),
      keywords: Vec::new(),
      member_conversations: (0..members)
        .map(|i| ClusterMember {
          session_id: format!("s{i}"),
          project_name: "demo".to_string(),
          timestamp,
          relevance: 1.0,
        })
        .collect(),
      aggregated_tech_stack: TechStack::default(),
    }
  }

  #[test]
  fn test_empty_inputs_produce_no_insights() {
    let statistics = CorpusStatistics::default();
    let word_cloud = WordCloudData::default();
    let empty = ClusterCollection::default();
    let inputs = InsightInputs {
      statistics: &statistics,
      word_cloud: &word_cloud,
      technology: &empty,
      task_types: &empty,
      topics: &empty,
      hourly: None,
    };

    assert!(generate_insights(&inputs).is_empty());
  }

  #[test]
  fn test_insights_are_ordered() {
    let statistics = CorpusStatistics {
      total_conversations: 4,
      conversations_with_code: 3,
      ..Default::default()
    };
    let word_cloud = WordCloudData::default();
    let technology = ClusterCollection { clusters: vec![cluster("Language: Rust", 3)], total_conversations: 4 };
    let task_types = ClusterCollection { clusters: vec![cluster("Task: Debugging", 2)], total_conversations: 4 };
    let topics = ClusterCollection::default();
    let inputs = InsightInputs {
      statistics: &statistics,
      word_cloud: &word_cloud,
      technology: &technology,
      task_types: &task_types,
      topics: &topics,
      hourly: None,
    };

    let insights = generate_insights(&inputs);
    let ids: Vec<&str> = insights.iter().map(|i| i.id.as_str()).collect();

    assert_eq!(ids, vec!["dominant-task", "primary-technology", "code-heavy"]);
    assert_eq!(insights[1].title, "Most discussed technology: Rust");
    assert_eq!(insights[1].description, "3 of 4 conversations involve Rust.");
    assert_eq!(insights[0].description, "2 conversations are about debugging.");
  }

  #[test]
  fn test_importance_parse() {
    assert_eq!("HIGH".parse::<Importance>(), Ok(Importance::High));
    assert!("urgent".parse::<Importance>().is_err());
    assert!(Importance::High < Importance::Low);
  }
}
