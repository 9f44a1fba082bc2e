use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::Language;

const ENGLISH_STOPWORDS: &[&str] = &[
  "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
  "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
  "but", "by", "can", "could", "did", "do", "does", "doing", "done", "down", "during", "each",
  "etc", "few", "for", "from", "further", "get", "got", "had", "has", "have", "having", "he",
  "her", "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
  "into", "is", "it", "its", "itself", "just", "let", "like", "may", "me", "might", "more",
  "most", "must", "my", "myself", "need", "no", "nor", "not", "now", "of", "off", "ok", "okay",
  "on", "once", "one", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
  "please", "same", "shall", "she", "should", "so", "some", "still", "such", "sure", "than",
  "thank", "thanks", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
  "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "us", "use",
  "used", "using", "very", "want", "was", "we", "well", "were", "what", "when", "where",
  "which", "while", "who", "whom", "why", "will", "with", "would", "yes", "yet", "you", "your",
  "yours", "yourself", "yourselves", "i'm", "it's", "don't", "can't", "let's", "that's",
];

const CHINESE_STOPWORDS: &[&str] = &[
  "的", "了", "是", "在", "我", "你", "他", "她", "它", "们", "这", "那", "有", "和", "与", "也",
  "就", "都", "而", "及", "或", "把", "被", "让", "给", "吗", "呢", "吧", "啊", "嗯", "请", "一个",
  "这个", "那个", "我们", "你们", "他们", "什么", "怎么", "如何", "可以", "需要", "因为", "所以",
  "但是", "如果", "然后", "还是", "已经", "没有", "一下", "帮我", "一些", "这样", "那样", "现在",
  "应该", "是否", "不是", "就是", "还有", "或者", "以及", "进行", "使用",
];

/// Single characters that act as word boundaries inside a run of CJK text
pub const CJK_BREAK_CHARS: &[char] = &[
  '的', '了', '是', '在', '和', '与', '也', '就', '都', '而', '及', '或', '把', '被', '让', '给',
  '吗', '呢', '吧', '啊',
];

static ENGLISH: Lazy<HashSet<&'static str>> = Lazy::new(|| ENGLISH_STOPWORDS.iter().copied().collect());
static CHINESE: Lazy<HashSet<&'static str>> = Lazy::new(|| CHINESE_STOPWORDS.iter().copied().collect());

pub fn is_english_stopword(token: &str) -> bool {
  ENGLISH.contains(token)
}

pub fn is_chinese_stopword(token: &str) -> bool {
  CHINESE.contains(token)
}

/// Remove stop-words for the detected language; `Mixed` applies English then Chinese
pub fn filter_stopwords(tokens: Vec<String>, language: Language) -> Vec<String> {
  match language {
    Language::En => tokens.into_iter().filter(|t| !is_english_stopword(t)).collect(),
    Language::Zh => tokens.into_iter().filter(|t| !is_chinese_stopword(t)).collect(),
    Language::Mixed => tokens
      .into_iter()
      .filter(|t| !is_english_stopword(t))
      .filter(|t| !is_chinese_stopword(t))
      .collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
  }

  #[test]
  fn test_english_filter_keeps_chinese_stopwords() {
    let tokens = owned(&["the", "parser", "我们"]);
    assert_eq!(filter_stopwords(tokens, Language::En), owned(&["parser", "我们"]));
  }

  #[test]
  fn test_chinese_filter_keeps_english_stopwords() {
    let tokens = owned(&["the", "数据库", "我们"]);
    assert_eq!(filter_stopwords(tokens, Language::Zh), owned(&["the", "数据库"]));
  }

  #[test]
  fn test_mixed_applies_both() {
    let tokens = owned(&["the", "数据库", "我们", "parser"]);
    assert_eq!(filter_stopwords(tokens, Language::Mixed), owned(&["数据库", "parser"]));
  }
}
