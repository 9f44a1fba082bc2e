//! Cluster types shared by the technology, task-type and topic clusterers
//!
//! Every clusterer groups conversations non-exclusively and drops groups with
//! fewer than [`MIN_CLUSTER_SIZE`] members.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::frequency::FrequencyAnalysis;
use crate::keywords::WordCategory;
use crate::technology::TechStack;

pub const MIN_CLUSTER_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
  pub session_id: String,
  pub project_name: String,
  pub timestamp: DateTime<Utc>,
  /// In [0, 1]
  pub relevance: f64,
}

impl ClusterMember {
  pub fn of(conversation: &Conversation, relevance: f64) -> Self {
    Self {
      session_id: conversation.session_id.clone(),
      project_name: conversation.project_name.clone(),
      timestamp: conversation.start_time,
      relevance: relevance.clamp(0.0, 1.0),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticCluster {
  pub id: String,
  pub label: String,
  pub keywords: Vec<String>,
  pub member_conversations: Vec<ClusterMember>,
  pub aggregated_tech_stack: TechStack,
}

impl SemanticCluster {
  pub fn size(&self) -> usize {
    self.member_conversations.len()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterCollection {
  pub clusters: Vec<SemanticCluster>,
  pub total_conversations: usize,
}

impl ClusterCollection {
  /// Sum of cluster sizes over corpus size; exceeds 1.0 with overlapping membership
  pub fn coverage(&self) -> f64 {
    if self.total_conversations == 0 {
      return 0.0;
    }
    let members: usize = self.clusters.iter().map(SemanticCluster::size).sum();
    members as f64 / self.total_conversations as f64
  }

  pub fn is_empty(&self) -> bool {
    self.clusters.is_empty()
  }

  /// Largest cluster; the earliest listed wins a tie
  pub fn largest(&self) -> Option<&SemanticCluster> {
    self.clusters.iter().fold(None, |best: Option<&SemanticCluster>, cluster| match best {
      Some(current) if current.size() >= cluster.size() => Some(current),
      _ => Some(cluster),
    })
  }
}

pub fn slugify(name: &str) -> String {
  let mut slug = String::new();
  for c in name.to_lowercase().chars() {
    match c {
      '+' => slug.push('p'),
      '#' => slug.push_str("sharp"),
      c if c.is_alphanumeric() => slug.push(c),
      _ => {
        if !slug.ends_with('-') && !slug.is_empty() {
          slug.push('-');
        }
      }
    }
  }
  slug.trim_end_matches('-').to_string()
}

/// A kind of work recognised by a set of patterns over lower-cased text
#[derive(Debug, Clone, Copy)]
pub struct TaskPattern {
  pub name: &'static str,
  pub patterns: &'static [&'static str],
}

pub const TASK_PATTERNS: &[TaskPattern] = &[
  TaskPattern {
    name: "Debugging",
    patterns: &[
      r"\b(?:bug|bugs|debug|debugging)\b",
      r"\berror\b|\bexception\b|\btraceback\b|\bstack trace\b",
      r"\bcrash(?:es|ed)?\b|\bpanic(?:ked|s)?\b|\bsegfault\b",
      r"\bfix(?:ed|ing)?\b|\bnot working\b|\bbroken\b",
    ],
  },
  TaskPattern {
    name: "Feature Development",
    patterns: &[
      r"\bimplement(?:ed|ing|ation)?\b",
      r"\badd (?:a |an )?(?:new )?(?:feature|endpoint|button|page|option|command)\b",
      r"\bcreate (?:a |an )?new\b",
      r"\bbuild (?:a|an) \w+",
    ],
  },
  TaskPattern {
    name: "Refactoring",
    patterns: &[
      r"\brefactor(?:ing|ed)?\b",
      r"\bclean(?:\s|-)?up\b",
      r"\brestructur(?:e|ing)\b|\bsimplif(?:y|ication)\b",
      r"\bextract (?:a |the )?(?:function|method|module|component)\b",
    ],
  },
  TaskPattern {
    name: "Testing",
    patterns: &[
      r"\bunit tests?\b|\bintegration tests?\b",
      r"\btest (?:case|suite|coverage)s?\b",
      r"\bmock(?:s|ing)?\b|\bfixtures?\b",
      r"\bassert(?:ion)?s?\b",
    ],
  },
  TaskPattern {
    name: "Documentation",
    patterns: &[
      r"\bdocument(?:ation|ing)?\b|\bdocs\b",
      r"\breadme\b",
      r"\bdocstrings?\b|\bdoc comments?\b",
      r"\bchangelog\b",
    ],
  },
  TaskPattern {
    name: "Performance",
    patterns: &[
      r"\bperformance\b|\bslow\b",
      r"\boptimi[sz](?:e|ation|ing)\b",
      r"\blatency\b|\bthroughput\b",
      r"\bmemory leak\b|\bprofil(?:e|ing|er)\b",
    ],
  },
  TaskPattern {
    name: "Deployment",
    patterns: &[
      r"\bdeploy(?:ment|ing|ed)?\b",
      r"\bci/cd\b|\bpipeline\b|\bgithub actions\b",
      r"\bproduction\b|\bstaging\b",
      r"\brelease\b",
    ],
  },
  TaskPattern {
    name: "Learning",
    patterns: &[
      r"\bexplain\b|\bexplanation\b",
      r"\bhow (?:does|do|to|can)\b",
      r"\bwhat (?:is|are|does)\b",
      r"\bdifference between\b|\bunderstand\b",
    ],
  },
  TaskPattern {
    name: "Code Review",
    patterns: &[
      r"\bcode review\b|\breview (?:this|my|the) (?:code|pr|changes)\b",
      r"\bpull request\b",
      r"\bbest practices?\b",
      r"\bfeedback\b|\bsuggestions?\b",
    ],
  },
];

static COMPILED_TASKS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| compile_tasks(TASK_PATTERNS));

fn compile_tasks(table: &[TaskPattern]) -> Vec<(&'static str, Vec<Regex>)> {
  table
    .iter()
    .map(|task| {
      let regexes = task
        .patterns
        .iter()
        .filter_map(|&pattern| match Regex::new(pattern) {
          Ok(regex) => Some(regex),
          Err(e) => {
            tracing::warn!(task = task.name, pattern, error = %e, "Skipping invalid task pattern");
            None
          }
        })
        .collect();
      (task.name, regexes)
    })
    .collect()
}

/// Fraction of a task's patterns matched, per task, in table order
fn task_scores(text: &str) -> Vec<f64> {
  let lowered = text.to_lowercase();
  COMPILED_TASKS
    .iter()
    .map(|(_, regexes)| {
      if regexes.is_empty() {
        return 0.0;
      }
      let matched = regexes.iter().filter(|r| r.is_match(&lowered)).count();
      matched as f64 / regexes.len() as f64
    })
    .collect()
}

/// Group conversations by the kind of work they contain
pub fn cluster_task_types(conversations: &[Conversation], stacks: &[TechStack]) -> ClusterCollection {
  let scores: Vec<Vec<f64>> = conversations.iter().map(|c| task_scores(&c.searchable_content)).collect();
  let mut clusters = Vec::new();

  for (task_index, (name, _)) in COMPILED_TASKS.iter().enumerate() {
    let members: Vec<(usize, f64)> = scores
      .iter()
      .enumerate()
      .filter(|(_, row)| row[task_index] > 0.0)
      .map(|(index, row)| (index, row[task_index]))
      .collect();

    if members.len() < MIN_CLUSTER_SIZE {
      continue;
    }

    let mut aggregated = TechStack::default();
    for (index, _) in &members {
      if let Some(stack) = stacks.get(*index) {
        aggregated.merge(stack);
      }
    }

    clusters.push(SemanticCluster {
      id: format!("task-{}", slugify(name)),
      label: format!("Task: {name}"),
      keywords: name.to_lowercase().split_whitespace().map(str::to_string).collect(),
      member_conversations: members
        .iter()
        .map(|(index, relevance)| ClusterMember::of(&conversations[*index], *relevance))
        .collect(),
      aggregated_tech_stack: aggregated,
    });
  }

  clusters.sort_by(|a, b| b.size().cmp(&a.size()).then_with(|| a.label.cmp(&b.label)));
  tracing::debug!(clusters = clusters.len(), "Task-type clustering complete");

  ClusterCollection { clusters, total_conversations: conversations.len() }
}

fn count_whole_word(text: &str, term: &str) -> usize {
  text
    .split(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '#')))
    .filter(|word| *word == term)
    .count()
}

/// Group conversations sharing a high-weight word that is not a named technology.
///
/// Candidates are taken in word-cloud order, so the heaviest terms form the
/// first clusters.
pub fn cluster_topics(
  conversations: &[Conversation],
  frequency: &FrequencyAnalysis,
  stacks: &[TechStack],
  max_clusters: usize,
) -> ClusterCollection {
  let mut clusters = Vec::new();

  for word in &frequency.word_cloud.words {
    if clusters.len() >= max_clusters {
      break;
    }
    if matches!(
      word.category,
      Some(WordCategory::Language) | Some(WordCategory::Framework) | Some(WordCategory::Tool)
    ) {
      continue;
    }

    let Ok(position) = frequency.term_frequencies.binary_search_by(|tf| tf.term.as_str().cmp(word.text.as_str())) else {
      continue;
    };
    let term = &frequency.term_frequencies[position];
    if term.document_frequency() < MIN_CLUSTER_SIZE {
      continue;
    }

    let members: Vec<(usize, usize)> = conversations
      .iter()
      .enumerate()
      .filter(|(_, c)| term.document_ids.contains(&c.session_id))
      .map(|(index, c)| (index, count_whole_word(&c.searchable_content.to_lowercase(), &term.term).max(1)))
      .collect();

    if members.len() < MIN_CLUSTER_SIZE {
      continue;
    }

    let max_occurrences = members.iter().map(|(_, n)| *n).max().unwrap_or(1);
    let mut aggregated = TechStack::default();
    for (index, _) in &members {
      if let Some(stack) = stacks.get(*index) {
        aggregated.merge(stack);
      }
    }

    clusters.push(SemanticCluster {
      id: format!("topic-{}", slugify(&term.term)),
      label: format!("Topic: {}", term.term),
      keywords: vec![term.term.clone()],
      member_conversations: members
        .iter()
        .map(|(index, n)| ClusterMember::of(&conversations[*index], *n as f64 / max_occurrences as f64))
        .collect(),
      aggregated_tech_stack: aggregated,
    });
  }

  tracing::debug!(clusters = clusters.len(), "Topic clustering complete");

  ClusterCollection { clusters, total_conversations: conversations.len() }
}
