//! Chatlens - Conversation Analytics
//!
//! Batch analysis over recorded assistant conversations: vocabulary and
//! phrase statistics, technology/task/topic clusters, an hourly activity
//! profile and a developer persona, assembled into one immutable report.

pub mod clock;
pub mod clusters;
pub mod config;
pub mod conversation;
pub mod error;
pub mod frequency;
pub mod history;
pub mod hourly;
pub mod insights;
pub mod keywords;
pub mod persona;
pub mod privacy;
pub mod report;
pub mod sentences;
pub mod technology;
pub mod text;
pub mod timeline;

pub use clock::Clock;
pub use config::{AnalyticsConfig, HistoryConfig, TextAnalysisConfig};
pub use conversation::{corpus_from_value, load_corpus, Conversation, Message, ToolInvocation};
pub use error::{AnalyticsError, Result};
pub use history::{load_history, HistoryEntry};
pub use insights::Importance;
pub use privacy::{PrivacySettings, RedactionPolicy};
pub use report::{AnalyticsReport, Analyzer};
pub use timeline::Period;
