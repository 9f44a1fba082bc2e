use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
  #[error("Failed to read config {path}: {source}")]
  ConfigRead { path: PathBuf, source: std::io::Error },

  #[error("Failed to parse config {path}: {message}")]
  ConfigParse { path: PathBuf, message: String },

  #[error("Invalid corpus: {message}")]
  InvalidCorpus { message: String },

  #[error("Failed to read corpus {path}: {source}")]
  CorpusRead { path: PathBuf, source: std::io::Error },

  #[error("Failed to read history log {path}: {source}")]
  HistoryRead { path: PathBuf, source: std::io::Error },
}

impl AnalyticsError {
  pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::ConfigRead { path: path.into(), source }
  }

  pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
    Self::ConfigParse { path: path.into(), message: message.into() }
  }

  pub fn invalid_corpus(message: impl Into<String>) -> Self {
    Self::InvalidCorpus { message: message.into() }
  }

  pub fn corpus_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::CorpusRead { path: path.into(), source }
  }

  pub fn history_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::HistoryRead { path: path.into(), source }
  }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
