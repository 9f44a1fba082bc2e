//! Developer persona classification
//!
//! Every archetype in [`PERSONA_CATALOG`] is scored from the activity and
//! learning patterns; the highest score wins and ties go to the archetype
//! listed first.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::hourly::{HourlyActivitySummary, StreakStats};

/// Temporal habits taken from the hourly summary
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivityPattern {
  /// `None` when there was no activity to bucket
  pub peak_hour: Option<u32>,
  pub peak_day: Option<Weekday>,
  pub weekend_ratio: f64,
  pub night_share: f64,
  pub early_share: f64,
}

impl ActivityPattern {
  pub fn from_summary(summary: Option<&HourlyActivitySummary>) -> Self {
    match summary {
      Some(summary) => Self {
        peak_hour: Some(summary.peak_hour.hour),
        peak_day: Some(summary.dominant_day),
        weekend_ratio: summary.weekend_share,
        night_share: summary.night_share,
        early_share: summary.early_share,
      },
      None => Self::default(),
    }
  }

  fn peak_in(&self, hours: &[std::ops::RangeInclusive<u32>]) -> bool {
    self.peak_hour.is_some_and(|hour| hours.iter().any(|range| range.contains(&hour)))
  }
}

/// How widely and deeply the corpus ranges over technologies
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LearningPattern {
  /// Distinct technology clusters
  pub breadth: usize,
  /// Conversations per technology cluster
  pub depth: f64,
  /// Active days over a 30 day month, capped at 1
  pub consistency: f64,
  /// Technology clusters per conversation
  pub exploration_rate: f64,
  pub conversation_count: usize,
}

impl LearningPattern {
  pub fn new(technology_clusters: usize, conversations: usize, active_days: usize) -> Self {
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

    Self {
      breadth: technology_clusters,
      depth: ratio(conversations, technology_clusters),
      consistency: (active_days as f64 / 30.0).min(1.0),
      exploration_rate: ratio(technology_clusters, conversations),
      conversation_count: conversations,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
  NightOwlHacker,
  EarlyBirdArchitect,
  WeekendWarrior,
  PolyglotExplorer,
  DeepSpecialist,
  ConsistentCrafter,
  DaytimeProfessional,
  RapidPrototyper,
}

impl PersonaKind {
  pub fn name(&self) -> &'static str {
    match self {
      PersonaKind::NightOwlHacker => "night_owl_hacker",
      PersonaKind::EarlyBirdArchitect => "early_bird_architect",
      PersonaKind::WeekendWarrior => "weekend_warrior",
      PersonaKind::PolyglotExplorer => "polyglot_explorer",
      PersonaKind::DeepSpecialist => "deep_specialist",
      PersonaKind::ConsistentCrafter => "consistent_crafter",
      PersonaKind::DaytimeProfessional => "daytime_professional",
      PersonaKind::RapidPrototyper => "rapid_prototyper",
    }
  }
}

/// Everything a scoring rule may look at
pub struct PersonaSignals<'a> {
  pub activity: &'a ActivityPattern,
  pub learning: &'a LearningPattern,
  pub streaks: &'a StreakStats,
}

pub struct PersonaDefinition {
  pub kind: PersonaKind,
  pub title: &'static str,
  pub description: &'static str,
  pub traits: &'static [&'static str],
  pub score: fn(&PersonaSignals) -> f64,
}

fn flag(condition: bool) -> f64 {
  if condition {
    1.0
  } else {
    0.0
  }
}

pub static PERSONA_CATALOG: [PersonaDefinition; 8] = [
  PersonaDefinition {
    kind: PersonaKind::NightOwlHacker,
    title: "Night Owl Hacker",
    description: "Does the best work after dark, when the notifications stop.",
    traits: &["late-night sessions", "long uninterrupted stretches", "thrives in quiet hours"],
    score: |s| 4.0 * s.activity.night_share + flag(s.activity.peak_in(&[22..=23, 0..=4])),
  },
  PersonaDefinition {
    kind: PersonaKind::EarlyBirdArchitect,
    title: "Early Bird Architect",
    description: "Plans and builds before the rest of the day catches up.",
    traits: &["morning sessions", "design before implementation", "steady routine"],
    score: |s| 3.0 * s.activity.early_share + flag(s.activity.peak_in(&[5..=9])),
  },
  PersonaDefinition {
    kind: PersonaKind::WeekendWarrior,
    title: "Weekend Warrior",
    description: "Saves the deep dives and side projects for Saturday and Sunday.",
    traits: &["weekend sessions", "side projects", "bursts of momentum"],
    score: |s| 5.0 * s.activity.weekend_ratio + flag(s.streaks.longest_streak > 7),
  },
  PersonaDefinition {
    kind: PersonaKind::PolyglotExplorer,
    title: "Polyglot Explorer",
    description: "Moves between languages and frameworks with ease.",
    traits: &["broad technology range", "frequent context switches", "curious about new tools"],
    score: |s| 3.0 * (s.learning.breadth as f64 / 10.0).min(1.0) + 2.0 * s.learning.exploration_rate,
  },
  PersonaDefinition {
    kind: PersonaKind::DeepSpecialist,
    title: "Deep Specialist",
    description: "Goes deep on a small, well-known stack.",
    traits: &["focused stack", "many conversations per technology", "mastery over novelty"],
    score: |s| 3.0 * (s.learning.depth / 10.0).min(1.0) + flag((1..=3).contains(&s.learning.breadth)),
  },
  PersonaDefinition {
    kind: PersonaKind::ConsistentCrafter,
    title: "Consistent Crafter",
    description: "Shows up most days and keeps the streak alive.",
    traits: &["daily practice", "long streaks", "incremental progress"],
    score: |s| 3.0 * s.learning.consistency + (s.streaks.longest_streak as f64 / 14.0).min(1.0),
  },
  PersonaDefinition {
    kind: PersonaKind::DaytimeProfessional,
    title: "Daytime Professional",
    description: "Keeps coding to working hours and protects evenings and weekends.",
    traits: &["business-hours sessions", "predictable schedule", "healthy boundaries"],
    score: |s| {
      2.0 * (1.0 - s.activity.night_share - s.activity.weekend_ratio).max(0.0) + flag(s.activity.peak_in(&[9..=17]))
    },
  },
  PersonaDefinition {
    kind: PersonaKind::RapidPrototyper,
    title: "Rapid Prototyper",
    description: "Spins up many short conversations to try ideas quickly.",
    traits: &["high conversation volume", "quick experiments", "ships early"],
    score: |s| 2.0 * (s.learning.conversation_count as f64 / 50.0).min(1.0) + s.learning.exploration_rate,
  },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonaScore {
  pub kind: PersonaKind,
  pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperPersona {
  pub kind: PersonaKind,
  pub name: String,
  pub title: String,
  pub description: String,
  pub traits: Vec<String>,
  pub score: f64,
  /// Score of every archetype, in catalog order
  pub scores: Vec<PersonaScore>,
}

pub fn classify(activity: &ActivityPattern, learning: &LearningPattern, streaks: &StreakStats) -> DeveloperPersona {
  let signals = PersonaSignals { activity, learning, streaks };
  let scores: Vec<PersonaScore> =
    PERSONA_CATALOG.iter().map(|persona| PersonaScore { kind: persona.kind, score: (persona.score)(&signals) }).collect();

  let mut best = 0;
  for (index, candidate) in scores.iter().enumerate().skip(1) {
    if candidate.score > scores[best].score {
      best = index;
    }
  }

  let winner = &PERSONA_CATALOG[best];
  tracing::debug!(persona = winner.kind.name(), score = scores[best].score, "Persona selected");

  DeveloperPersona {
    kind: winner.kind,
    name: winner.kind.name().to_string(),
    title: winner.title.to_string(),
    description: winner.description.to_string(),
    traits: winner.traits.iter().map(|t| t.to_string()).collect(),
    score: scores[best].score,
    scores,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn activity(peak_hour: u32, night: f64, early: f64, weekend: f64) -> ActivityPattern {
    ActivityPattern {
      peak_hour: Some(peak_hour),
      peak_day: Some(Weekday::Wed),
      weekend_ratio: weekend,
      night_share: night,
      early_share: early,
    }
  }

  #[test]
  fn test_catalog_order_is_fixed() {
    let names: Vec<&str> = PERSONA_CATALOG.iter().map(|p| p.kind.name()).collect();
    assert_eq!(
      names,
      vec![
        "night_owl_hacker",
        "early_bird_architect",
        "weekend_warrior",
        "polyglot_explorer",
        "deep_specialist",
        "consistent_crafter",
        "daytime_professional",
        "rapid_prototyper",
      ]
    );
  }

  #[test]
  fn test_night_owl() {
    let persona = classify(&activity(23, 0.9, 0.0, 0.0), &LearningPattern::new(1, 3, 2), &StreakStats::default());
    assert_eq!(persona.kind, PersonaKind::NightOwlHacker);
    assert!((persona.score - 4.6).abs() < 1e-9);
  }

  #[test]
  fn test_weekend_beats_early_bird() {
    let persona =
      classify(&activity(8, 0.0, 1.0, 1.0), &LearningPattern::new(0, 4, 2), &StreakStats { active_days: 2, longest_streak: 2 });
    // early bird: 3 + 1 = 4, weekend warrior: 5
    assert_eq!(persona.kind, PersonaKind::WeekendWarrior);
  }

  #[test]
  fn test_ties_go_to_first_listed() {
    // Without activity data the daytime rule scores 2.0; fifty conversations give the rapid prototyper 2.0 too
    let learning = LearningPattern { conversation_count: 50, ..LearningPattern::default() };
    let persona = classify(&ActivityPattern::default(), &learning, &StreakStats::default());

    assert_eq!(persona.kind, PersonaKind::DaytimeProfessional);
    assert_eq!(persona.scores.len(), 8);
    assert_eq!(persona.scores[6].score, persona.scores[7].score);
  }

  #[test]
  fn test_every_corpus_gets_a_persona() {
    let persona = classify(&ActivityPattern::default(), &LearningPattern::default(), &StreakStats::default());
    assert_eq!(persona.name, "daytime_professional");
    assert_eq!(persona.score, 2.0);
    assert!(!persona.traits.is_empty());
  }

  #[test]
  fn test_learning_pattern_guards_zero() {
    let learning = LearningPattern::new(0, 0, 0);
    assert_eq!(learning.depth, 0.0);
    assert_eq!(learning.exploration_rate, 0.0);

    let learning = LearningPattern::new(4, 2, 45);
    assert_eq!(learning.depth, 0.5);
    assert_eq!(learning.consistency, 1.0);
  }

  #[test]
  fn test_exploration_rate_is_not_capped() {
    // Technology clusters overlap, so breadth can exceed the conversation count
    assert_eq!(LearningPattern::new(4, 2, 1).exploration_rate, 2.0);
    assert_eq!(LearningPattern::new(5, 2, 1).exploration_rate, 2.5);
    assert_eq!(LearningPattern::new(1, 4, 1).exploration_rate, 0.25);
  }

  #[test]
  fn test_activity_from_missing_summary() {
    let pattern = ActivityPattern::from_summary(None);
    assert_eq!(pattern.peak_hour, None);
    assert!(!pattern.peak_in(&[0..=23]));
  }
}
