use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use chatlens::clusters::ClusterCollection;
use chatlens::hourly::Tone;
use chatlens::insights::Importance;
use chatlens::{load_corpus, AnalyticsConfig, AnalyticsReport, Analyzer, PrivacySettings};

const TOTAL_WIDTH: usize = 72;
const TOP_WORDS: usize = 15;
const TOP_PHRASES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
  Pretty,
  Json,
}

/// Chatlens - Conversation Analytics
#[derive(Parser)]
#[command(name = "chatlens")]
#[command(about = "Vocabulary, technology clusters, activity rhythm and persona from recorded conversations")]
#[command(version)]
struct Cli {
  /// JSON file holding an array of conversations
  #[arg(value_name = "CORPUS")]
  corpus: PathBuf,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
  format: OutputFormat,

  /// Redact project names, paths and session ids
  #[arg(long)]
  shareable: bool,

  /// Replace project names with aliases
  #[arg(long)]
  hide_projects: bool,

  /// Replace file paths with a placeholder
  #[arg(long)]
  hide_paths: bool,

  /// Replace session ids with aliases
  #[arg(long)]
  hide_sessions: bool,

  /// Configuration file (JSON or YAML)
  #[arg(short, long, env = "CHATLENS_CONFIG")]
  config: Option<PathBuf>,

  /// Directory holding history.jsonl
  #[arg(long, env = "CHATLENS_HISTORY_DIR")]
  history_dir: Option<PathBuf>,

  /// Days of history to include
  #[arg(long)]
  lookback_days: Option<u32>,

  /// Keep only the most recent history records
  #[arg(long)]
  max_history_records: Option<usize>,

  /// Fixed UTC offset for hour/day bucketing, e.g. -300
  #[arg(long, allow_hyphen_values = true)]
  utc_offset_minutes: Option<i32>,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,
}

impl Cli {
  fn privacy(&self) -> Option<PrivacySettings> {
    let settings = PrivacySettings {
      hide_project_names: self.hide_projects,
      hide_file_paths: self.hide_paths,
      hide_session_ids: self.hide_sessions,
    };

    if settings != PrivacySettings::default() {
      Some(settings)
    } else if self.shareable {
      Some(PrivacySettings::strict())
    } else {
      None
    }
  }

  fn resolve_config(&self) -> Result<AnalyticsConfig> {
    let mut config = match &self.config {
      Some(path) => AnalyticsConfig::load_from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?,
      None => AnalyticsConfig::load().context("Failed to load config")?,
    };

    if let Some(dir) = &self.history_dir {
      config.history.directory = Some(dir.clone());
    }
    if let Some(days) = self.lookback_days {
      config.history.lookback_days = days;
    }
    if let Some(max) = self.max_history_records {
      config.history.max_records = Some(max);
    }
    if let Some(minutes) = self.utc_offset_minutes {
      config.utc_offset_minutes = Some(minutes);
    }

    Ok(config)
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("chatlens=info,warn") };
  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

  let config = cli.resolve_config()?;
  let conversations = load_corpus(&cli.corpus)
    .with_context(|| format!("Failed to load corpus from {}", cli.corpus.display()))?;

  let mut report = Analyzer::new(config).analyze(&conversations);
  if let Some(settings) = cli.privacy() {
    report = report.shareable(&settings);
  }

  match cli.format {
    OutputFormat::Json => {
      println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize report")?);
    }
    OutputFormat::Pretty => print_report(&report),
  }

  Ok(())
}

fn print_header(title: &str) {
  println!();
  println!("{}", title.purple().bold());
  println!("{}", "=".repeat(TOTAL_WIDTH));
}

fn print_row(label: &str, value: &str) {
  let padding = TOTAL_WIDTH.saturating_sub(label.chars().count() + value.chars().count() + 1);
  println!("{}{} {}", label, ".".repeat(padding).dimmed(), value);
}

fn percent(share: f64) -> String {
  format!("{:.0}%", share * 100.0)
}

fn print_report(report: &AnalyticsReport) {
  println!("{}", "🔍 Chatlens - Conversation Analytics".purple().bold());

  let stats = report.statistics();
  print_header("OVERVIEW");
  print_row("Conversations", &stats.total_conversations.to_string());
  print_row("Messages", &stats.total_messages.to_string());
  print_row("Projects", &stats.unique_projects.to_string());
  print_row("Active days", &stats.active_days.to_string());
  print_row("Tool invocations", &stats.tool_invocations.to_string());
  print_row("Vocabulary richness", &format!("{:.2}", stats.vocabulary_richness));

  let persona = report.persona();
  print_header("PERSONA");
  println!("{} {}", persona.title.cyan().bold(), format!("({:.2})", persona.score).dimmed());
  println!("{}", persona.description.italic());
  for trait_name in &persona.traits {
    println!("  - {trait_name}");
  }

  let cloud = report.word_cloud();
  if !cloud.words.is_empty() {
    print_header("TOP TERMS");
    for word in cloud.words.iter().take(TOP_WORDS) {
      print_row(&word.text, &format!("{:.2} ({}x)", word.tfidf_weight, word.raw_value));
    }
  }
  if !cloud.phrases.is_empty() {
    print_header("PHRASES");
    for phrase in cloud.phrases.iter().take(TOP_PHRASES) {
      print_row(&phrase.text, &format!("{}x", phrase.frequency));
      if let Some(context) = phrase.contexts.first() {
        println!("    {}", context.dimmed());
      }
    }
  }

  print_clusters("TECHNOLOGIES", report.technology_clusters());
  print_clusters("TASKS", report.task_clusters());
  print_clusters("TOPICS", report.topic_clusters());

  if let Some(hourly) = report.hourly_activity() {
    print_header("ACTIVITY");
    print_row("Events", &hourly.total_events.to_string());
    print_row("Peak hour", &format!("{} ({})", hourly.peak_hour.label, hourly.peak_hour.count));
    print_row("Quiet hour", &format!("{} ({})", hourly.quiet_hour.label, hourly.quiet_hour.count));
    print_row(
      "Focus window",
      &format!("{:02}:00-{:02}:59", hourly.focus_window.start_hour, hourly.focus_window.end_hour),
    );
    print_row("Busiest day", &hourly.dominant_day.to_string());
    print_row("Night share", &percent(hourly.night_share));
    print_row("Weekend share", &percent(hourly.weekend_share));
    for recommendation in &hourly.recommendations {
      let marker = match recommendation.tone {
        Tone::Positive => "+".green(),
        Tone::Neutral => "*".normal(),
        Tone::Caution => "!".yellow(),
      };
      println!("  {} {}", marker, recommendation.message);
    }
  }

  if !report.insights().is_empty() {
    print_header("INSIGHTS");
    for insight in report.insights() {
      let title = match insight.importance {
        Importance::High => insight.title.red().bold(),
        Importance::Medium => insight.title.yellow(),
        Importance::Low => insight.title.normal(),
      };
      println!("{title}");
      println!("    {}", insight.description.dimmed());
    }
  }
}

fn print_clusters(title: &str, collection: &ClusterCollection) {
  if collection.is_empty() {
    return;
  }
  print_header(title);
  for cluster in &collection.clusters {
    print_row(&cluster.label, &format!("{} conversations", cluster.size()));
  }
  print_row("Coverage", &format!("{:.2}", collection.coverage()));
}
