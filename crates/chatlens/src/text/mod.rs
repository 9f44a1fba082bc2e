//! Text extraction and normalization
//!
//! Turns conversation turns into attributable text spans and those spans into
//! filtered token streams. Code is stripped before tokenizing; it is matched
//! separately by the technology detector through the searchable content.

mod language;
pub mod stopwords;

pub use language::{detect_language, is_cjk, is_latin_letter, Language};
pub use stopwords::filter_stopwords;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::TextAnalysisConfig;
use crate::conversation::{Conversation, Role};
use stopwords::CJK_BREAK_CHARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
  User,
  Assistant,
  Mixed,
}

impl From<Role> for TextSource {
  fn from(role: Role) -> Self {
    match role {
      Role::User => TextSource::User,
      Role::Assistant => TextSource::Assistant,
    }
  }
}

/// A non-empty span of original turn text attributed to its conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
  pub content: String,
  pub source: TextSource,
  pub conversation_id: String,
  pub timestamp: DateTime<Utc>,
}

/// Token stream of one span after normalization and stop-word removal
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedText {
  pub language: Language,
  pub tokens: Vec<String>,
}

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]*`").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());
static EMAIL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{1,3}|_{2,3}|~~").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s{0,3}(?:#{1,6}|>)\s?").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One span per non-empty turn; a conversation without turns but with
/// searchable content yields a single `Mixed` span.
pub fn extract(conversation: &Conversation) -> Vec<ExtractedText> {
  if conversation.messages.is_empty() {
    let content = conversation.searchable_content.trim();
    if content.is_empty() {
      return Vec::new();
    }
    return vec![ExtractedText {
      content: content.to_string(),
      source: TextSource::Mixed,
      conversation_id: conversation.session_id.clone(),
      timestamp: conversation.start_time,
    }];
  }

  conversation
    .messages
    .iter()
    .filter(|message| !message.content().trim().is_empty())
    .map(|message| ExtractedText {
      content: message.content().trim().to_string(),
      source: message.role().into(),
      conversation_id: conversation.session_id.clone(),
      timestamp: message.timestamp(),
    })
    .collect()
}

/// Strip URLs, e-mail addresses, code spans and markdown emphasis, then collapse whitespace
pub fn normalize(text: &str) -> String {
  let text = FENCED_CODE.replace_all(text, " ");
  let text = INLINE_CODE.replace_all(&text, " ");
  let text = URL.replace_all(&text, " ");
  let text = EMAIL.replace_all(&text, " ");
  let text = HEADING.replace_all(&text, " ");
  let text = EMPHASIS.replace_all(&text, " ");
  WHITESPACE.replace_all(&text, " ").trim().to_string()
}

fn is_token_char(c: char) -> bool {
  c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '#')
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
  let token = current.trim_matches(|c| c == '-' || c == '_');
  if !token.is_empty() {
    tokens.push(token.to_string());
  }
  current.clear();
}

/// Split on whitespace and punctuation, and at every CJK/non-CJK boundary
fn split_tokens(text: &str) -> Vec<String> {
  let mut tokens = Vec::new();
  let mut current = String::new();
  let mut current_is_cjk = false;

  for c in text.chars() {
    let cjk = is_cjk(c);
    if cjk && CJK_BREAK_CHARS.contains(&c) {
      flush(&mut current, &mut tokens);
      continue;
    }
    if !is_token_char(c) {
      flush(&mut current, &mut tokens);
      continue;
    }
    if !current.is_empty() && cjk != current_is_cjk {
      flush(&mut current, &mut tokens);
    }
    current_is_cjk = cjk;
    current.push(c);
  }
  flush(&mut current, &mut tokens);

  tokens
}

fn is_valid_token(token: &str, config: &TextAnalysisConfig) -> bool {
  let length = token.chars().count();
  if length < config.min_token_length || length > config.max_token_length {
    return false;
  }
  if token.chars().all(|c| c.is_numeric() || matches!(c, '-' | '_' | '+' | '#')) {
    return false;
  }
  token.chars().any(|c| is_latin_letter(c) || is_cjk(c))
}

/// Lower-cased tokens of already-normalized text that pass the length and letter rules
pub fn tokenize(text: &str, config: &TextAnalysisConfig) -> Vec<String> {
  split_tokens(&text.to_lowercase())
    .into_iter()
    .filter(|token| is_valid_token(token, config))
    .collect()
}

/// Normalize, detect language, tokenize and remove stop-words
pub fn analyze_text(text: &str, config: &TextAnalysisConfig) -> TokenizedText {
  let normalized = normalize(text);
  let language = detect_language(&normalized);
  let tokens = filter_stopwords(tokenize(&normalized, config), language);
  TokenizedText { language, tokens }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::conversation::Message;
  use chrono::TimeZone;

  fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap()
  }

  #[test]
  fn test_extract_drops_blank_turns() {
    let conversation = Conversation::new(
      "s1",
      "demo",
      at(9),
      vec![
        Message::user("  Explain lifetimes  ", at(9)),
        Message::assistant("   \n ", at(9)),
        Message::assistant("Lifetimes describe borrows.", at(10)),
      ],
    );

    let spans = extract(&conversation);
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].content, "Explain lifetimes");
    assert_eq!(spans[0].source, TextSource::User);
    assert_eq!(spans[1].source, TextSource::Assistant);
    assert_eq!(spans[1].timestamp, at(10));
    assert!(spans.iter().all(|s| s.conversation_id == "s1"));
  }

  #[test]
  fn test_extract_falls_back_to_searchable_content() {
    let mut conversation = Conversation::new("s2", "demo", at(9), Vec::new());
    conversation.searchable_content = "imported transcript".to_string();

    let spans = extract(&conversation);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].source, TextSource::Mixed);
  }

  #[test]
  fn test_normalize_strips_noise() {
    let text = "See **https://docs.rs/serde** or mail me@example.com\n```rust\nfn main() {}\n```\nUse `cargo build` for *speed*";
    let normalized = normalize(text);
    assert_eq!(normalized, "See or mail Use for speed");
  }

  #[test]
  fn test_tokenize_rules() {
    let config = TextAnalysisConfig::default();
    let tokens = tokenize("a 42 3.14 tokio-runtime snake_case C++ x", &config);
    assert_eq!(tokens, vec!["tokio-runtime", "snake_case", "c++"]);
  }

  #[test]
  fn test_tokenize_splits_scripts() {
    let config = TextAnalysisConfig::default();
    let tokens = tokenize("使用React构建的界面", &config);
    assert_eq!(tokens, vec!["使用", "react", "构建", "界面"]);
  }

  #[test]
  fn test_tokenize_respects_max_length() {
    let config = TextAnalysisConfig { max_token_length: 5, ..TextAnalysisConfig::default() };
    assert_eq!(tokenize("short lengthy", &config), vec!["short"]);
  }

  #[test]
  fn test_analyze_text_filters_stopwords() {
    let config = TextAnalysisConfig::default();
    let result = analyze_text("How do I configure the Tokio runtime?", &config);
    assert_eq!(result.language, Language::En);
    assert_eq!(result.tokens, vec!["configure", "tokio", "runtime"]);
  }

  #[test]
  fn test_analyze_text_mixed() {
    let config = TextAnalysisConfig::default();
    let result = analyze_text("我们的数据库 schema 需要 migration", &config);
    assert_eq!(result.language, Language::Mixed);
    assert_eq!(result.tokens, vec!["数据库", "schema", "migration"]);
  }
}
