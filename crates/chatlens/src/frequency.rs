//! Term frequency, TF-IDF weighting and n-gram phrase extraction
//!
//! The corpus is consumed one conversation at a time; only per-term and
//! per-phrase counters outlive a conversation.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::TextAnalysisConfig;
use crate::conversation::Conversation;
use crate::keywords::{categorize, WordCategory};
use crate::text::{self, Language};

/// Corpus-wide occurrence count of a term and the conversations containing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermFrequency {
  pub term: String,
  pub frequency: usize,
  pub document_ids: BTreeSet<String>,
}

impl TermFrequency {
  pub fn document_frequency(&self) -> usize {
    self.document_ids.len()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
  pub text: String,
  pub raw_value: usize,
  pub tfidf_weight: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category: Option<WordCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseEntry {
  pub text: String,
  pub frequency: usize,
  pub contexts: Vec<String>,
}

/// Word cloud section of a report; words are sorted by descending weight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordCloudData {
  pub words: Vec<WordEntry>,
  pub phrases: Vec<PhraseEntry>,
  pub total_tokens: usize,
  pub unique_tokens: usize,
  pub total_documents: usize,
  pub language_distribution: BTreeMap<Language, usize>,
}

impl WordCloudData {
  /// Unique over total tokens; 0 for an empty corpus
  pub fn vocabulary_richness(&self) -> f64 {
    if self.total_tokens == 0 {
      0.0
    } else {
      self.unique_tokens as f64 / self.total_tokens as f64
    }
  }

  pub fn is_empty(&self) -> bool {
    self.total_tokens == 0
  }
}

/// Output of one frequency pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyAnalysis {
  pub word_cloud: WordCloudData,
  /// Every surviving term, sorted by term
  pub term_frequencies: Vec<TermFrequency>,
}

/// `raw * ln(total / df)`; 0 when the term is in every document or there are no documents
pub fn tfidf_weight(raw_frequency: usize, document_frequency: usize, total_documents: usize) -> f64 {
  if total_documents == 0 || document_frequency == 0 || document_frequency >= total_documents {
    return 0.0;
  }
  raw_frequency as f64 * (total_documents as f64 / document_frequency as f64).ln()
}

#[derive(Default)]
struct PhraseCounter {
  count: usize,
  contexts: Vec<String>,
}

pub struct FrequencyAnalyzer {
  config: TextAnalysisConfig,
}

impl FrequencyAnalyzer {
  pub fn new(config: &TextAnalysisConfig) -> Self {
    Self { config: config.clone() }
  }

  pub fn analyze(&self, conversations: &[Conversation]) -> FrequencyAnalysis {
    let mut terms: HashMap<String, TermFrequency> = HashMap::new();
    let mut phrases: HashMap<String, PhraseCounter> = HashMap::new();
    let mut languages: BTreeMap<Language, usize> = BTreeMap::new();
    let mut total_tokens = 0;
    let mut total_documents = 0;

    for conversation in conversations {
      let spans = text::extract(conversation);
      if spans.is_empty() {
        continue;
      }
      total_documents += 1;

      let mut document_terms: HashSet<String> = HashSet::new();
      for span in &spans {
        let tokenized = text::analyze_text(&span.content, &self.config);
        *languages.entry(tokenized.language).or_insert(0) += 1;
        total_tokens += tokenized.tokens.len();

        for token in &tokenized.tokens {
          terms
            .entry(token.clone())
            .or_insert_with(|| TermFrequency {
              term: token.clone(),
              frequency: 0,
              document_ids: BTreeSet::new(),
            })
            .frequency += 1;
          document_terms.insert(token.clone());
        }

        self.count_phrases(&tokenized.tokens, &span.content, &mut phrases);
      }

      for term in document_terms {
        if let Some(entry) = terms.get_mut(&term) {
          entry.document_ids.insert(conversation.session_id.clone());
        }
      }
    }

    if total_documents == 0 {
      return FrequencyAnalysis::default();
    }

    let words = self.word_entries(&terms, total_documents);
    let phrases = self.phrase_entries(phrases);

    tracing::debug!(
      documents = total_documents,
      tokens = total_tokens,
      unique = terms.len(),
      words = words.len(),
      phrases = phrases.len(),
      "Frequency analysis complete"
    );

    let mut term_frequencies: Vec<TermFrequency> = terms.into_values().collect();
    term_frequencies.sort_by(|a, b| a.term.cmp(&b.term));

    FrequencyAnalysis {
      word_cloud: WordCloudData {
        words,
        phrases,
        total_tokens,
        unique_tokens: term_frequencies.len(),
        total_documents,
        language_distribution: languages,
      },
      term_frequencies,
    }
  }

  fn count_phrases(&self, tokens: &[String], original: &str, phrases: &mut HashMap<String, PhraseCounter>) {
    for &size in &self.config.ngram_sizes {
      if size == 0 || tokens.len() < size {
        continue;
      }
      for window in tokens.windows(size) {
        let phrase = window.join(" ");
        let counter = phrases.entry(phrase.clone()).or_default();
        counter.count += 1;
        if counter.contexts.len() >= self.config.max_contexts {
          continue;
        }
        if let Some(context) = phrase_context(original, &phrase, self.config.context_radius) {
          if !counter.contexts.contains(&context) {
            counter.contexts.push(context);
          }
        }
      }
    }
  }

  fn word_entries(&self, terms: &HashMap<String, TermFrequency>, total_documents: usize) -> Vec<WordEntry> {
    let mut words: Vec<WordEntry> = terms
      .values()
      .map(|tf| WordEntry {
        text: tf.term.clone(),
        raw_value: tf.frequency,
        tfidf_weight: tfidf_weight(tf.frequency, tf.document_frequency(), total_documents),
        category: categorize(&tf.term),
      })
      .filter(|entry| entry.tfidf_weight >= self.config.min_frequency)
      .collect();

    words.sort_by(|a, b| {
      b.tfidf_weight.partial_cmp(&a.tfidf_weight).unwrap_or(Ordering::Equal).then_with(|| a.text.cmp(&b.text))
    });
    words.truncate(self.config.max_words);
    words
  }

  fn phrase_entries(&self, phrases: HashMap<String, PhraseCounter>) -> Vec<PhraseEntry> {
    let mut entries: Vec<PhraseEntry> = phrases
      .into_iter()
      .filter(|(_, counter)| counter.count as f64 >= self.config.min_frequency)
      .map(|(text, counter)| PhraseEntry { text, frequency: counter.count, contexts: counter.contexts })
      .collect();

    entries.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.text.cmp(&b.text)));
    entries.truncate(self.config.max_phrases);
    entries
  }
}

/// Up to `radius` characters either side of the first case-insensitive match,
/// with an ellipsis on each truncated side
pub fn phrase_context(original: &str, phrase: &str, radius: usize) -> Option<String> {
  let chars: Vec<char> = original.chars().collect();
  let lowered: Vec<char> = chars.iter().map(|c| c.to_lowercase().next().unwrap_or(*c)).collect();
  let needle: Vec<char> = phrase.chars().collect();
  if needle.is_empty() || needle.len() > lowered.len() {
    return None;
  }

  let start = lowered.windows(needle.len()).position(|window| window == needle.as_slice())?;
  let end = start + needle.len();
  let from = start.saturating_sub(radius);
  let to = (end + radius).min(chars.len());

  let excerpt: String = chars[from..to].iter().collect();
  let mut context = excerpt.split_whitespace().collect::<Vec<_>>().join(" ");
  if from > 0 {
    context = format!("...{context}");
  }
  if to < chars.len() {
    context.push_str("...");
  }
  Some(context)
}
