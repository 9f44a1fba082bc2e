//! Conversation data model consumed by every analysis stage
//!
//! Conversations are produced by an external loader; this module only defines
//! their shape and the derived fields a loader may omit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::{AnalyticsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

/// A tool call made by the assistant during a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub input: Option<Value>,
}

/// One turn of a conversation, tagged by role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
  User {
    content: String,
    timestamp: DateTime<Utc>,
  },
  Assistant {
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default, rename = "toolUses", skip_serializing_if = "Vec::is_empty")]
    tool_uses: Vec<ToolInvocation>,
  },
}

impl Message {
  pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
    Message::User { content: content.into(), timestamp }
  }

  pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
    Message::Assistant { content: content.into(), timestamp, tool_uses: Vec::new() }
  }

  pub fn role(&self) -> Role {
    match self {
      Message::User { .. } => Role::User,
      Message::Assistant { .. } => Role::Assistant,
    }
  }

  pub fn content(&self) -> &str {
    match self {
      Message::User { content, .. } | Message::Assistant { content, .. } => content,
    }
  }

  pub fn timestamp(&self) -> DateTime<Utc> {
    match self {
      Message::User { timestamp, .. } | Message::Assistant { timestamp, .. } => *timestamp,
    }
  }

  pub fn tool_uses(&self) -> &[ToolInvocation] {
    match self {
      Message::User { .. } => &[],
      Message::Assistant { tool_uses, .. } => tool_uses,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
  pub session_id: String,
  pub project_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub project_path: Option<String>,
  #[serde(default)]
  pub messages: Vec<Message>,
  pub start_time: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_time: Option<DateTime<Utc>>,
  /// Concatenated turn text used for pattern matching
  #[serde(default)]
  pub searchable_content: String,
  #[serde(default)]
  pub message_count: usize,
  #[serde(default)]
  pub word_count: usize,
  #[serde(default)]
  pub has_code: bool,
  #[serde(default)]
  pub uses_tools: bool,
}

impl Conversation {
  /// Build a conversation and derive its precomputed fields from the turns
  pub fn new(
    session_id: impl Into<String>,
    project_name: impl Into<String>,
    start_time: DateTime<Utc>,
    messages: Vec<Message>,
  ) -> Self {
    Self {
      session_id: session_id.into(),
      project_name: project_name.into(),
      project_path: None,
      messages,
      start_time,
      end_time: None,
      searchable_content: String::new(),
      message_count: 0,
      word_count: 0,
      has_code: false,
      uses_tools: false,
    }
    .completed()
  }

  pub fn with_project_path(mut self, path: impl Into<String>) -> Self {
    self.project_path = Some(path.into());
    self
  }

  /// Fill derived fields a loader left empty; fields it supplied are kept
  pub fn completed(mut self) -> Self {
    if self.messages.is_empty() {
      return self;
    }

    if self.searchable_content.trim().is_empty() {
      self.searchable_content =
        self.messages.iter().map(Message::content).collect::<Vec<_>>().join("\n");
    }
    if self.message_count == 0 {
      self.message_count = self.messages.len();
    }
    if self.word_count == 0 {
      self.word_count =
        self.messages.iter().map(|m| m.content().split_whitespace().count()).sum();
    }
    if self.end_time.is_none() {
      self.end_time = self.messages.iter().map(Message::timestamp).max();
    }
    self.has_code = self.has_code || self.messages.iter().any(|m| m.content().contains("```"));
    self.uses_tools = self.uses_tools || self.messages.iter().any(|m| !m.tool_uses().is_empty());
    self
  }

  pub fn tool_invocation_count(&self) -> usize {
    self.messages.iter().map(|m| m.tool_uses().len()).sum()
  }
}

/// Interpret a loosely typed value as a corpus.
///
/// Only a non-array top level is an error; individual entries that do not
/// describe a conversation are skipped.
pub fn corpus_from_value(value: Value) -> Result<Vec<Conversation>> {
  let items = match value {
    Value::Array(items) => items,
    other => {
      return Err(AnalyticsError::invalid_corpus(format!(
        "expected an array of conversations, found {}",
        json_kind(&other)
      )))
    }
  };

  let mut conversations = Vec::with_capacity(items.len());
  for (index, item) in items.into_iter().enumerate() {
    match serde_json::from_value::<Conversation>(item) {
      Ok(conversation) => conversations.push(conversation.completed()),
      Err(e) => tracing::warn!(index, error = %e, "Skipping malformed conversation"),
    }
  }

  Ok(conversations)
}

/// Read a corpus from a JSON file holding an array of conversations
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Conversation>> {
  let path = path.as_ref();
  let content =
    std::fs::read_to_string(path).map_err(|e| AnalyticsError::corpus_read(path, e))?;
  let value: Value = serde_json::from_str(&content).map_err(|e| {
    AnalyticsError::invalid_corpus(format!("{} is not valid JSON: {}", path.display(), e))
  })?;
  corpus_from_value(value)
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
