//! Redaction policies for shareable reports

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static UNIX_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:~|\.{1,2})?(?:/[\w.@-]+){2,}/?").unwrap());
static WINDOWS_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z]:\\(?:[\w .@-]+\\)*[\w.@-]+").unwrap());

pub const PATH_PLACEHOLDER: &str = "[path]";

/// Decides what identifying text survives into a shareable report.
///
/// `ordinal` is a stable 1-based index of the value among all distinct values
/// of its kind in the report, so aliases stay consistent across sections.
pub trait RedactionPolicy {
  fn redact_project(&self, name: &str, ordinal: usize) -> String;
  fn redact_text(&self, text: &str) -> String;
  fn redact_session(&self, session_id: &str, ordinal: usize) -> String;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
  #[serde(default)]
  pub hide_project_names: bool,
  #[serde(default)]
  pub hide_file_paths: bool,
  #[serde(default)]
  pub hide_session_ids: bool,
}

impl PrivacySettings {
  /// Hide everything this policy knows how to hide
  pub fn strict() -> Self {
    Self { hide_project_names: true, hide_file_paths: true, hide_session_ids: true }
  }
}

pub fn redact_paths(text: &str) -> String {
  let text = UNIX_PATH.replace_all(text, PATH_PLACEHOLDER);
  WINDOWS_PATH.replace_all(&text, PATH_PLACEHOLDER).into_owned()
}

impl RedactionPolicy for PrivacySettings {
  fn redact_project(&self, name: &str, ordinal: usize) -> String {
    if self.hide_project_names {
      format!("project-{ordinal}")
    } else if self.hide_file_paths {
      redact_paths(name)
    } else {
      name.to_string()
    }
  }

  fn redact_text(&self, text: &str) -> String {
    if self.hide_file_paths {
      redact_paths(text)
    } else {
      text.to_string()
    }
  }

  fn redact_session(&self, session_id: &str, ordinal: usize) -> String {
    if self.hide_session_ids {
      format!("session-{ordinal}")
    } else {
      session_id.to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_keeps_everything() {
    let settings = PrivacySettings::default();
    assert_eq!(settings.redact_project("billing-api", 1), "billing-api");
    assert_eq!(settings.redact_session("abc-123", 4), "abc-123");
    assert_eq!(settings.redact_text("see /home/ana/work/api"), "see /home/ana/work/api");
  }

  #[test]
  fn test_strict_aliases() {
    let settings = PrivacySettings::strict();
    assert_eq!(settings.redact_project("billing-api", 2), "project-2");
    assert_eq!(settings.redact_session("abc-123", 7), "session-7");
  }

  #[test]
  fn test_paths_are_replaced() {
    assert_eq!(redact_paths("edit /home/ana/work/api/src/main.rs now"), "edit [path] now");
    assert_eq!(redact_paths("open ~/projects/site"), "open [path]");
    assert_eq!(redact_paths(r"in C:\Users\ana\repo\lib.rs"), "in [path]");
    assert_eq!(redact_paths("a/b is not a path"), "a/b is not a path");
  }
}
