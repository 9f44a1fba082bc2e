//! Sentence patterns of user turns: questions, commands and common openers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::text::{self, ExtractedText, TextSource};

const TOP_OPENERS: usize = 10;

const TERMINATORS: &[char] = &['.', '!', '?', '。', '！', '？'];

const QUESTION_WORDS: &[&str] = &[
  "what", "why", "how", "when", "where", "which", "who", "whose", "is", "are", "can", "could", "would",
  "should", "does", "do", "did", "will", "shall",
];

const COMMAND_VERBS: &[&str] = &[
  "add", "build", "change", "check", "convert", "create", "delete", "explain", "fix", "generate", "help",
  "implement", "improve", "install", "make", "move", "please", "refactor", "remove", "rename", "replace",
  "run", "show", "update", "use", "write",
];

const CHINESE_COMMAND_PREFIXES: &[&str] = &["请", "帮我", "帮忙", "给我"];
const CHINESE_QUESTION_MARKERS: &[&str] = &["吗", "呢", "什么", "怎么", "为什么", "如何"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceKind {
  Question,
  Command,
  Statement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenerCount {
  pub word: String,
  pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentencePatternSummary {
  pub total_sentences: usize,
  pub questions: usize,
  pub commands: usize,
  pub statements: usize,
  pub average_words_per_sentence: f64,
  /// Most frequent first words, by count then word
  pub top_openers: Vec<OpenerCount>,
}

impl SentencePatternSummary {
  pub fn question_ratio(&self) -> f64 {
    if self.total_sentences == 0 {
      0.0
    } else {
      self.questions as f64 / self.total_sentences as f64
    }
  }
}

/// Split on terminal punctuation, keeping the terminator of each sentence
pub fn split_sentences(text: &str) -> Vec<(&str, Option<char>)> {
  let mut sentences = Vec::new();
  let mut start = 0;

  for (index, c) in text.char_indices() {
    if TERMINATORS.contains(&c) {
      let sentence = text[start..index].trim();
      if !sentence.is_empty() {
        sentences.push((sentence, Some(c)));
      }
      start = index + c.len_utf8();
    }
  }

  let rest = text[start..].trim();
  if !rest.is_empty() {
    sentences.push((rest, None));
  }
  sentences
}

fn first_word(sentence: &str) -> Option<String> {
  let word = sentence.split_whitespace().next()?;
  let word: String = word.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
  (!word.is_empty()).then_some(word)
}

pub fn classify_sentence(sentence: &str, terminator: Option<char>) -> SentenceKind {
  if matches!(terminator, Some('?') | Some('？')) {
    return SentenceKind::Question;
  }

  if CHINESE_QUESTION_MARKERS.iter().any(|marker| sentence.contains(marker)) {
    return SentenceKind::Question;
  }
  if CHINESE_COMMAND_PREFIXES.iter().any(|prefix| sentence.starts_with(prefix)) {
    return SentenceKind::Command;
  }

  match first_word(sentence) {
    Some(word) if QUESTION_WORDS.contains(&word.as_str()) && terminator != Some('!') => SentenceKind::Question,
    Some(word) if COMMAND_VERBS.contains(&word.as_str()) => SentenceKind::Command,
    _ => SentenceKind::Statement,
  }
}

/// Running tally of user sentences, fed one span at a time
#[derive(Debug, Default)]
pub struct SentenceCounter {
  summary: SentencePatternSummary,
  openers: BTreeMap<String, usize>,
  total_words: usize,
}

impl SentenceCounter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Count the sentences of a user-authored span; code is stripped first
  pub fn observe(&mut self, span: &ExtractedText) {
    if span.source != TextSource::User {
      return;
    }

    let normalized = text::normalize(&span.content);
    for (sentence, terminator) in split_sentences(&normalized) {
      self.summary.total_sentences += 1;
      self.total_words += sentence.split_whitespace().count();

      match classify_sentence(sentence, terminator) {
        SentenceKind::Question => self.summary.questions += 1,
        SentenceKind::Command => self.summary.commands += 1,
        SentenceKind::Statement => self.summary.statements += 1,
      }

      if let Some(word) = first_word(sentence) {
        *self.openers.entry(word).or_insert(0) += 1;
      }
    }
  }

  pub fn finish(self) -> SentencePatternSummary {
    let mut summary = self.summary;
    if summary.total_sentences > 0 {
      summary.average_words_per_sentence = self.total_words as f64 / summary.total_sentences as f64;
    }

    let mut openers: Vec<OpenerCount> =
      self.openers.into_iter().map(|(word, count)| OpenerCount { word, count }).collect();
    openers.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    openers.truncate(TOP_OPENERS);
    summary.top_openers = openers;

    summary
  }
}

pub fn analyze_sentences(spans: &[ExtractedText]) -> SentencePatternSummary {
  let mut counter = SentenceCounter::new();
  for span in spans {
    counter.observe(span);
  }
  counter.finish()
}
