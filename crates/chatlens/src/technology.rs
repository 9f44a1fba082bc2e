//! Technology stack detection and clustering
//!
//! Detection is boolean per conversation: a named pattern either matches the
//! lower-cased searchable content or it does not. Conversations sharing a
//! language, framework or tool are grouped into non-exclusive clusters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::clusters::{slugify, ClusterCollection, ClusterMember, SemanticCluster, MIN_CLUSTER_SIZE};
use crate::conversation::Conversation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechCategory {
  Language,
  Framework,
  Tool,
  Platform,
}

impl TechCategory {
  /// Categories that produce clusters; platforms are detected only
  pub const CLUSTERED: [TechCategory; 3] = [TechCategory::Language, TechCategory::Framework, TechCategory::Tool];

  pub fn label(&self) -> &'static str {
    match self {
      TechCategory::Language => "Language",
      TechCategory::Framework => "Framework",
      TechCategory::Tool => "Tool",
      TechCategory::Platform => "Platform",
    }
  }

  pub fn slug(&self) -> &'static str {
    match self {
      TechCategory::Language => "language",
      TechCategory::Framework => "framework",
      TechCategory::Tool => "tool",
      TechCategory::Platform => "platform",
    }
  }
}

/// A canonical technology name and the pattern that detects it in lower-cased text
#[derive(Debug, Clone, Copy)]
pub struct TechPattern {
  pub category: TechCategory,
  pub name: &'static str,
  pub pattern: &'static str,
}

const fn tech(category: TechCategory, name: &'static str, pattern: &'static str) -> TechPattern {
  TechPattern { category, name, pattern }
}

use TechCategory::{Framework, Language, Platform, Tool};

pub const TECH_PATTERNS: &[TechPattern] = &[
  tech(Language, "Python", r"\bpython\d?\b|\.py\b|\bpip3?\s+install\b"),
  tech(Language, "JavaScript", r"\bjavascript\b|\bnode\.?js\b|\.js\b|\.mjs\b"),
  tech(Language, "TypeScript", r"\btypescript\b|\.tsx?\b|\btsconfig\b"),
  tech(Language, "Rust", r"\brust\b|\brustc\b|\bcargo\.toml\b|\.rs\b"),
  tech(Language, "Go", r"\bgolang\b|\bgo\s+(?:mod|build|run|test|get)\b|\.go\b"),
  tech(Language, "Java", r"\bjava\b|\.java\b|\bjvm\b"),
  tech(Language, "Kotlin", r"\bkotlin\b|\.kt\b"),
  tech(Language, "Swift", r"\bswift\b|\.swift\b"),
  tech(Language, "C++", r"c\+\+|\bcpp\b|\.hpp\b"),
  tech(Language, "C#", r"\bc#|\bcsharp\b|\.cs\b|\bdotnet\b"),
  tech(Language, "Ruby", r"\bruby\b|\.rb\b"),
  tech(Language, "PHP", r"\bphp\b"),
  tech(Language, "SQL", r"\bsql\b"),
  tech(Language, "Shell", r"\bbash\b|\bzsh\b|\bshell script\b|\.sh\b"),
  tech(Framework, "React", r"\breact(?:\.js|js)?\b|\bjsx\b|\busestate\b|\buseeffect\b"),
  tech(Framework, "Vue", r"\bvue(?:\.js|js)?\b|\bnuxt\b"),
  tech(Framework, "Angular", r"\bangular\b"),
  tech(Framework, "Svelte", r"\bsvelte(?:kit)?\b"),
  tech(Framework, "Next.js", r"\bnext\.?js\b"),
  tech(Framework, "Django", r"\bdjango\b"),
  tech(Framework, "Flask", r"\bflask\b"),
  tech(Framework, "FastAPI", r"\bfastapi\b"),
  tech(Framework, "Express", r"\bexpress\.?js\b|\bexpress\s+(?:server|app|router|middleware)\b"),
  tech(Framework, "Spring", r"\bspring\s*boot\b|\bspring\s+framework\b"),
  tech(Framework, "Rails", r"\brails\b"),
  tech(Framework, "Tailwind", r"\btailwind(?:css)?\b"),
  tech(Framework, "Tokio", r"\btokio\b"),
  tech(Framework, "Axum", r"\baxum\b"),
  tech(Framework, "Actix", r"\bactix(?:-web)?\b"),
  tech(Framework, "Tauri", r"\btauri\b"),
  tech(Framework, "Flutter", r"\bflutter\b"),
  tech(Framework, "PyTorch", r"\bpytorch\b|\btorch\b"),
  tech(Framework, "TensorFlow", r"\btensorflow\b"),
  tech(Tool, "Git", r"\bgit\s+(?:commit|push|pull|rebase|merge|checkout|branch|status|diff|log|clone|stash)\b|\bgithub\b|\bgitlab\b|\.gitignore\b"),
  tech(Tool, "Docker", r"\bdocker(?:file)?\b|\bdocker-compose\b"),
  tech(Tool, "Kubernetes", r"\bkubernetes\b|\bk8s\b|\bkubectl\b|\bhelm\b"),
  tech(Tool, "Terraform", r"\bterraform\b"),
  tech(Tool, "Webpack", r"\bwebpack\b"),
  tech(Tool, "Vite", r"\bvite\b"),
  tech(Tool, "npm", r"\bnpm\b|\bpackage\.json\b|\byarn\b|\bpnpm\b"),
  tech(Tool, "Cargo", r"\bcargo\s+(?:build|run|test|check|add|clippy|fmt)\b|\bcargo\.toml\b"),
  tech(Tool, "Jest", r"\bjest\b"),
  tech(Tool, "Pytest", r"\bpytest\b"),
  tech(Tool, "ESLint", r"\beslint\b"),
  tech(Tool, "PostgreSQL", r"\bpostgres(?:ql)?\b|\bpsql\b"),
  tech(Tool, "MySQL", r"\bmysql\b"),
  tech(Tool, "SQLite", r"\bsqlite3?\b"),
  tech(Tool, "Redis", r"\bredis\b"),
  tech(Tool, "MongoDB", r"\bmongo(?:db)?\b"),
  tech(Tool, "VS Code", r"\bvs ?code\b|\bvisual studio code\b"),
  tech(Platform, "AWS", r"\baws\b|\bamazon web services\b|\bec2\b|\bs3 bucket\b"),
  tech(Platform, "GCP", r"\bgcp\b|\bgoogle cloud\b"),
  tech(Platform, "Azure", r"\bazure\b"),
  tech(Platform, "Vercel", r"\bvercel\b"),
  tech(Platform, "Netlify", r"\bnetlify\b"),
  tech(Platform, "Heroku", r"\bheroku\b"),
  tech(Platform, "Cloudflare", r"\bcloudflare\b"),
  tech(Platform, "Linux", r"\blinux\b|\bubuntu\b|\bdebian\b"),
  tech(Platform, "macOS", r"\bmacos\b|\bhomebrew\b"),
  tech(Platform, "Windows", r"\bwindows\b|\bpowershell\b"),
  tech(Platform, "iOS", r"\bios\b|\bxcode\b"),
  tech(Platform, "Android", r"\bandroid\b"),
];

static COMPILED_PATTERNS: Lazy<Vec<(TechPattern, Regex)>> = Lazy::new(|| {
  TECH_PATTERNS
    .iter()
    .filter_map(|tech| match Regex::new(tech.pattern) {
      Ok(regex) => Some((*tech, regex)),
      Err(e) => {
        tracing::warn!(name = tech.name, error = %e, "Skipping invalid technology pattern");
        None
      }
    })
    .collect()
});

/// Technologies detected in one or more conversations, by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStack {
  pub languages: BTreeSet<String>,
  pub frameworks: BTreeSet<String>,
  pub tools: BTreeSet<String>,
  pub platforms: BTreeSet<String>,
}

impl TechStack {
  pub fn get(&self, category: TechCategory) -> &BTreeSet<String> {
    match category {
      TechCategory::Language => &self.languages,
      TechCategory::Framework => &self.frameworks,
      TechCategory::Tool => &self.tools,
      TechCategory::Platform => &self.platforms,
    }
  }

  fn get_mut(&mut self, category: TechCategory) -> &mut BTreeSet<String> {
    match category {
      TechCategory::Language => &mut self.languages,
      TechCategory::Framework => &mut self.frameworks,
      TechCategory::Tool => &mut self.tools,
      TechCategory::Platform => &mut self.platforms,
    }
  }

  pub fn insert(&mut self, category: TechCategory, name: impl Into<String>) {
    self.get_mut(category).insert(name.into());
  }

  /// Union `other` into this stack
  pub fn merge(&mut self, other: &TechStack) {
    self.languages.extend(other.languages.iter().cloned());
    self.frameworks.extend(other.frameworks.iter().cloned());
    self.tools.extend(other.tools.iter().cloned());
    self.platforms.extend(other.platforms.iter().cloned());
  }

  pub fn is_empty(&self) -> bool {
    self.languages.is_empty() && self.frameworks.is_empty() && self.tools.is_empty() && self.platforms.is_empty()
  }

  /// Clustered technologies (languages, frameworks, tools) in category order
  pub fn clustered(&self) -> impl Iterator<Item = &String> {
    self.languages.iter().chain(self.frameworks.iter()).chain(self.tools.iter())
  }

  /// Every detected technology, platforms included
  pub fn all(&self) -> impl Iterator<Item = &String> {
    self.clustered().chain(self.platforms.iter())
  }
}

/// Run every pattern against the lower-cased text
pub fn detect(text: &str) -> TechStack {
  let lowered = text.to_lowercase();
  let mut stack = TechStack::default();
  for (tech, regex) in COMPILED_PATTERNS.iter() {
    if regex.is_match(&lowered) {
      stack.insert(tech.category, tech.name);
    }
  }
  stack
}

/// Stack of every conversation, index-aligned with the corpus
pub fn detect_all(conversations: &[Conversation]) -> Vec<TechStack> {
  conversations.iter().map(|c| detect(&c.searchable_content)).collect()
}

pub fn cluster_technologies(conversations: &[Conversation]) -> ClusterCollection {
  let stacks = detect_all(conversations);
  cluster_technologies_with(conversations, &stacks)
}

/// Cluster using stacks already detected by [`detect_all`]
pub fn cluster_technologies_with(conversations: &[Conversation], stacks: &[TechStack]) -> ClusterCollection {
  let mut clusters = Vec::new();

  for category in TechCategory::CLUSTERED {
    let mut mentions: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, stack) in stacks.iter().enumerate() {
      for name in stack.get(category) {
        mentions.entry(name.as_str()).or_default().push(index);
      }
    }

    let mut category_clusters: Vec<SemanticCluster> = mentions
      .into_iter()
      .filter(|(_, members)| members.len() >= MIN_CLUSTER_SIZE)
      .map(|(name, members)| build_cluster(category, name, &members, conversations, stacks))
      .collect();

    category_clusters.sort_by(|a, b| b.size().cmp(&a.size()).then_with(|| a.label.cmp(&b.label)));
    clusters.extend(category_clusters);
  }

  tracing::debug!(clusters = clusters.len(), "Technology clustering complete");

  ClusterCollection { clusters, total_conversations: conversations.len() }
}

fn build_cluster(
  category: TechCategory,
  name: &str,
  members: &[usize],
  conversations: &[Conversation],
  stacks: &[TechStack],
) -> SemanticCluster {
  let mut aggregated = TechStack::default();
  for &index in members {
    aggregated.merge(&stacks[index]);
  }

  SemanticCluster {
    id: format!("tech-{}-{}", category.slug(), slugify(name)),
    label: format!("{}: {}", category.label(), name),
    keywords: vec![name.to_lowercase()],
    member_conversations: members.iter().map(|&index| ClusterMember::of(&conversations[index], 1.0)).collect(),
    aggregated_tech_stack: aggregated,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::conversation::Message;
  use chrono::{TimeZone, Utc};

  fn conversation(id: &str, text: &str) -> Conversation {
    let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
    Conversation::new(id, "demo", at, vec![Message::user(text, at)])
  }

  #[test]
  fn test_all_patterns_compile() {
    assert_eq!(COMPILED_PATTERNS.len(), TECH_PATTERNS.len());
  }

  #[test]
  fn test_detect_canonical_names() {
    let stack = detect("Porting our TypeScript + React app to Next.js, deployed on Vercel via Docker");
    assert!(stack.languages.contains("TypeScript"));
    assert!(stack.frameworks.contains("React"));
    assert!(stack.frameworks.contains("Next.js"));
    assert!(stack.tools.contains("Docker"));
    assert!(stack.platforms.contains("Vercel"));
  }

  #[test]
  fn test_detect_avoids_common_false_positives() {
    let stack = detect("Let's go ahead and write some javascript. Check the json output.");
    assert!(!stack.languages.contains("Go"));
    assert!(!stack.languages.contains("Java"));
    assert!(stack.languages.contains("JavaScript"));
  }

  #[test]
  fn test_unknown_text_matches_nothing() {
    assert!(detect("quarterly budget spreadsheet review").is_empty());
    assert!(detect("").is_empty());
  }

  #[test]
  fn test_single_mention_produces_no_cluster() {
    let corpus = vec![
      conversation("a", "A React hooks question"),
      conversation("b", "Another React component"),
      conversation("c", "Migrating a Vue app"),
    ];
    let collection = cluster_technologies(&corpus);

    assert_eq!(collection.clusters.len(), 1);
    let react = &collection.clusters[0];
    assert_eq!(react.label, "Framework: React");
    assert_eq!(react.id, "tech-framework-react");
    assert_eq!(react.size(), 2);
    assert!(react.member_conversations.iter().all(|m| m.relevance == 1.0));
    assert_eq!(collection.total_conversations, 3);
  }

  #[test]
  fn test_membership_is_non_exclusive_and_stack_is_union() {
    let corpus = vec![
      conversation("a", "Python Flask API with Redis"),
      conversation("b", "Python Flask blueprint on AWS"),
      conversation("c", "Python script for cleanup"),
    ];
    let collection = cluster_technologies(&corpus);

    let labels: Vec<&str> = collection.clusters.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Language: Python", "Framework: Flask"]);

    let flask = &collection.clusters[1];
    assert!(flask.aggregated_tech_stack.tools.contains("Redis"));
    assert!(flask.aggregated_tech_stack.platforms.contains("AWS"));
    assert!(collection.coverage() > 1.0);
  }

  #[test]
  fn test_platforms_are_not_clustered() {
    let corpus = vec![conversation("a", "deploy to AWS"), conversation("b", "AWS credentials")];
    assert!(cluster_technologies(&corpus).is_empty());
  }
}
