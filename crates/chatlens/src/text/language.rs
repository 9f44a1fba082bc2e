use serde::{Deserialize, Serialize};

/// Script-level language of a span of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  En,
  Zh,
  Mixed,
}

pub fn is_cjk(c: char) -> bool {
  matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

pub fn is_latin_letter(c: char) -> bool {
  c.is_ascii_alphabetic() || (matches!(c, '\u{00C0}'..='\u{024F}') && c.is_alphabetic())
}

/// Classify by the share of CJK characters among CJK + Latin letters.
///
/// Strictly above 70% is `zh`, strictly below 30% is `en`, the closed
/// interval between is `mixed`. Text with neither script is `en`.
pub fn detect_language(text: &str) -> Language {
  let (cjk, latin) = text.chars().fold((0usize, 0usize), |(cjk, latin), c| {
    if is_cjk(c) {
      (cjk + 1, latin)
    } else if is_latin_letter(c) {
      (cjk, latin + 1)
    } else {
      (cjk, latin)
    }
  });

  let total = cjk + latin;
  if total == 0 {
    return Language::En;
  }

  // integer comparison keeps the 0.3 / 0.7 boundaries exact
  if cjk * 10 > total * 7 {
    Language::Zh
  } else if cjk * 10 < total * 3 {
    Language::En
  } else {
    Language::Mixed
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pure_scripts() {
    assert_eq!(detect_language("the quick brown fox"), Language::En);
    assert_eq!(detect_language("我们今天讨论数据库设计"), Language::Zh);
  }

  #[test]
  fn test_empty_defaults_to_english() {
    assert_eq!(detect_language(""), Language::En);
    assert_eq!(detect_language("12345 !!! ..."), Language::En);
  }

  #[test]
  fn test_seventy_percent_cjk_is_mixed() {
    // 7 CJK + 3 Latin
    assert_eq!(detect_language("数据库设计模式abc"), Language::Mixed);
    // 8 CJK + 2 Latin
    assert_eq!(detect_language("数据库设计模式好ab"), Language::Zh);
  }

  #[test]
  fn test_thirty_percent_cjk_is_mixed() {
    // 3 CJK + 7 Latin
    assert_eq!(detect_language("数据库abcdefg"), Language::Mixed);
    // 2 CJK + 8 Latin
    assert_eq!(detect_language("数据abcdefgh"), Language::En);
  }

  #[test]
  fn test_accented_latin_counts_as_latin() {
    assert_eq!(detect_language("café résumé"), Language::En);
  }
}
