//! Configuration management for chatlens
//!
//! Handles loading and defaulting of the text-analysis thresholds, the
//! history log location and the calendar offset used for bucketing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clock::Clock;
use crate::{AnalyticsError, Result};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
  /// Tokenizer, TF-IDF and phrase settings
  #[serde(default)]
  pub text: TextAnalysisConfig,
  /// External event log settings
  #[serde(default)]
  pub history: HistoryConfig,
  /// Fixed UTC offset for hour/day bucketing; host local time when absent
  #[serde(default)]
  pub utc_offset_minutes: Option<i32>,
  /// Upper bound on topic clusters in a report
  #[serde(default = "default_max_topic_clusters")]
  pub max_topic_clusters: usize,
}

/// Thresholds for vocabulary and phrase analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysisConfig {
  #[serde(default = "default_min_token_length")]
  pub min_token_length: usize,
  #[serde(default = "default_max_token_length")]
  pub max_token_length: usize,
  /// Applied to the TF-IDF weight of words and to the raw count of phrases
  #[serde(default = "default_min_frequency")]
  pub min_frequency: f64,
  #[serde(default = "default_max_words")]
  pub max_words: usize,
  #[serde(default = "default_max_phrases")]
  pub max_phrases: usize,
  #[serde(default = "default_ngram_sizes")]
  pub ngram_sizes: Vec<usize>,
  #[serde(default = "default_max_contexts")]
  pub max_contexts: usize,
  /// Characters kept on each side of a phrase in its sample context
  #[serde(default = "default_context_radius")]
  pub context_radius: usize,
}

/// Location and bounds of the append-only history log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
  /// Directory holding the log; `~/.claude` when absent
  #[serde(default)]
  pub directory: Option<PathBuf>,
  #[serde(default = "default_history_file_name")]
  pub file_name: String,
  #[serde(default = "default_lookback_days")]
  pub lookback_days: u32,
  /// Keep only the most recent N records
  #[serde(default)]
  pub max_records: Option<usize>,
}

fn default_max_topic_clusters() -> usize {
  20
}
fn default_min_token_length() -> usize {
  2
}
fn default_max_token_length() -> usize {
  50
}
fn default_min_frequency() -> f64 {
  2.0
}
fn default_max_words() -> usize {
  100
}
fn default_max_phrases() -> usize {
  50
}
fn default_ngram_sizes() -> Vec<usize> {
  vec![2, 3]
}
fn default_max_contexts() -> usize {
  3
}
fn default_context_radius() -> usize {
  50
}
fn default_history_file_name() -> String {
  "history.jsonl".to_string()
}
fn default_lookback_days() -> u32 {
  30
}

impl Default for TextAnalysisConfig {
  fn default() -> Self {
    Self {
      min_token_length: default_min_token_length(),
      max_token_length: default_max_token_length(),
      min_frequency: default_min_frequency(),
      max_words: default_max_words(),
      max_phrases: default_max_phrases(),
      ngram_sizes: default_ngram_sizes(),
      max_contexts: default_max_contexts(),
      context_radius: default_context_radius(),
    }
  }
}

impl Default for HistoryConfig {
  fn default() -> Self {
    Self {
      directory: None,
      file_name: default_history_file_name(),
      lookback_days: default_lookback_days(),
      max_records: None,
    }
  }
}

impl HistoryConfig {
  /// Full path of the history log, if a directory can be resolved
  pub fn log_path(&self) -> Option<PathBuf> {
    let directory = match &self.directory {
      Some(dir) => dir.clone(),
      None => dirs::home_dir()?.join(".claude"),
    };
    Some(directory.join(&self.file_name))
  }
}

impl Default for AnalyticsConfig {
  fn default() -> Self {
    Self {
      text: TextAnalysisConfig::default(),
      history: HistoryConfig::default(),
      utc_offset_minutes: None,
      max_topic_clusters: default_max_topic_clusters(),
    }
  }
}

impl AnalyticsConfig {
  /// Load configuration from a JSON or YAML file, chosen by extension
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content =
      std::fs::read_to_string(path).map_err(|e| AnalyticsError::config_read(path, e))?;

    let is_yaml = matches!(
      path.extension().and_then(|ext| ext.to_str()),
      Some("yaml") | Some("yml")
    );

    if is_yaml {
      serde_yaml::from_str(&content).map_err(|e| AnalyticsError::config_parse(path, e.to_string()))
    } else {
      serde_json::from_str(&content).map_err(|e| AnalyticsError::config_parse(path, e.to_string()))
    }
  }

  /// Load configuration from current directory or defaults
  pub fn load() -> Result<Self> {
    let config_paths = [".chatlens.json", "chatlens.json", ".chatlens.yaml"];

    for path in &config_paths {
      if Path::new(path).exists() {
        return Self::load_from_file(path);
      }
    }

    Ok(AnalyticsConfig::default())
  }

  /// Save configuration to a file as pretty JSON
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(self)
      .map_err(|e| AnalyticsError::config_parse(path, e.to_string()))?;
    std::fs::write(path, content).map_err(|e| AnalyticsError::config_read(path, e))?;
    Ok(())
  }

  /// Calendar used for every hour/day bucket in a run
  pub fn clock(&self) -> Clock {
    match self.utc_offset_minutes {
      Some(minutes) => Clock::fixed_minutes(minutes),
      None => Clock::Local,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn test_text_defaults() {
    let text = TextAnalysisConfig::default();
    assert_eq!(text.min_token_length, 2);
    assert_eq!(text.max_token_length, 50);
    assert_eq!(text.min_frequency, 2.0);
    assert_eq!(text.max_words, 100);
    assert_eq!(text.max_phrases, 50);
    assert_eq!(text.ngram_sizes, vec![2, 3]);
    assert_eq!(text.max_contexts, 3);
  }

  #[test]
  fn test_history_defaults() {
    let history = HistoryConfig::default();
    assert_eq!(history.lookback_days, 30);
    assert_eq!(history.file_name, "history.jsonl");
    assert!(history.max_records.is_none());
  }

  #[test]
  fn test_log_path_uses_directory() {
    let history = HistoryConfig { directory: Some(PathBuf::from("/data/logs")), ..HistoryConfig::default() };
    assert_eq!(history.log_path(), Some(PathBuf::from("/data/logs/history.jsonl")));
  }

  #[test]
  fn test_load_partial_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("chatlens.json");
    fs::write(&config_path, r#"{ "text": { "max_words": 10 }, "utc_offset_minutes": 60 }"#).unwrap();

    let config = AnalyticsConfig::load_from_file(&config_path).unwrap();
    assert_eq!(config.text.max_words, 10);
    assert_eq!(config.text.min_token_length, 2);
    assert_eq!(config.utc_offset_minutes, Some(60));
    assert_eq!(config.history, HistoryConfig::default());
  }

  #[test]
  fn test_load_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("chatlens.yaml");
    fs::write(&config_path, "history:\n  lookback_days: 7\n  max_records: 500\n").unwrap();

    let config = AnalyticsConfig::load_from_file(&config_path).unwrap();
    assert_eq!(config.history.lookback_days, 7);
    assert_eq!(config.history.max_records, Some(500));
  }

  #[test]
  fn test_load_invalid_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.json");
    fs::write(&config_path, "{ invalid json }").unwrap();

    let result = AnalyticsConfig::load_from_file(&config_path);
    assert!(matches!(result, Err(AnalyticsError::ConfigParse { .. })));
  }

  #[test]
  fn test_load_missing_file() {
    let result = AnalyticsConfig::load_from_file("does-not-exist.json");
    assert!(matches!(result, Err(AnalyticsError::ConfigRead { .. })));
  }

  #[test]
  fn test_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("saved.json");

    let mut original = AnalyticsConfig::default();
    original.text.ngram_sizes = vec![2];
    original.history.max_records = Some(42);
    original.save_to_file(&config_path).unwrap();

    let loaded = AnalyticsConfig::load_from_file(&config_path).unwrap();
    assert_eq!(original, loaded);
  }
}
