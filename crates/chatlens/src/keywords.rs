//! Static vocabulary tables used to categorize word-cloud terms

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordCategory {
  Language,
  Framework,
  Tool,
  Concept,
}

pub const LANGUAGE_KEYWORDS: &[&str] = &[
  "python", "javascript", "typescript", "rust", "golang", "java", "kotlin", "swift", "ruby",
  "php", "c++", "c#", "csharp", "scala", "elixir", "haskell", "clojure", "lua", "perl", "dart",
  "sql", "bash", "shell", "zsh", "powershell", "html", "css", "scss", "solidity", "zig", "julia",
];

pub const FRAMEWORK_KEYWORDS: &[&str] = &[
  "react", "vue", "angular", "svelte", "nextjs", "nuxt", "remix", "django", "flask", "fastapi",
  "express", "nestjs", "spring", "rails", "laravel", "tailwind", "bootstrap", "tokio", "axum",
  "actix", "rocket", "tauri", "electron", "flutter", "pytorch", "tensorflow", "pandas", "numpy",
  "jquery", "redux", "graphql", "prisma", "sqlalchemy",
];

pub const TOOL_KEYWORDS: &[&str] = &[
  "git", "github", "gitlab", "docker", "kubernetes", "k8s", "helm", "terraform", "ansible",
  "webpack", "vite", "babel", "eslint", "prettier", "npm", "yarn", "pnpm", "cargo", "pip",
  "poetry", "jest", "vitest", "pytest", "cypress", "playwright", "postgres", "postgresql",
  "mysql", "sqlite", "redis", "mongodb", "elasticsearch", "kafka", "nginx", "vscode", "vim",
  "neovim", "jenkins", "grafana", "prometheus",
];

pub const CONCEPT_KEYWORDS: &[&str] = &[
  "api", "rest", "async", "await", "concurrency", "thread", "closure", "trait", "interface",
  "generic", "generics", "lifetime", "ownership", "borrow", "pointer", "recursion", "algorithm",
  "database", "schema", "migration", "query", "index", "cache", "caching", "authentication",
  "authorization", "token", "middleware", "component", "state", "hook", "hooks", "testing",
  "refactor", "refactoring", "deployment", "pipeline", "architecture", "microservice",
  "performance", "optimization", "security", "encryption", "serialization", "parser",
  "compiler", "runtime", "memory", "regex", "websocket", "http", "json", "yaml",
];

/// Category of a lower-cased term; tables are checked in priority order
pub fn categorize(term: &str) -> Option<WordCategory> {
  let tables: [(WordCategory, &[&str]); 4] = [
    (WordCategory::Language, LANGUAGE_KEYWORDS),
    (WordCategory::Framework, FRAMEWORK_KEYWORDS),
    (WordCategory::Tool, TOOL_KEYWORDS),
    (WordCategory::Concept, CONCEPT_KEYWORDS),
  ];

  tables.iter().find(|(_, words)| words.contains(&term)).map(|(category, _)| *category)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_categorize() {
    assert_eq!(categorize("rust"), Some(WordCategory::Language));
    assert_eq!(categorize("react"), Some(WordCategory::Framework));
    assert_eq!(categorize("docker"), Some(WordCategory::Tool));
    assert_eq!(categorize("ownership"), Some(WordCategory::Concept));
    assert_eq!(categorize("banana"), None);
  }

  #[test]
  fn test_tables_are_lowercase() {
    for table in [LANGUAGE_KEYWORDS, FRAMEWORK_KEYWORDS, TOOL_KEYWORDS, CONCEPT_KEYWORDS] {
      for word in table {
        assert_eq!(*word, word.to_lowercase(), "{word} should be lower-case");
      }
    }
  }

  #[test]
  fn test_tables_do_not_overlap() {
    let mut seen = HashSet::new();
    for table in [LANGUAGE_KEYWORDS, FRAMEWORK_KEYWORDS, TOOL_KEYWORDS, CONCEPT_KEYWORDS] {
      for word in table {
        assert!(seen.insert(*word), "{word} appears in more than one table");
      }
    }
  }
}
