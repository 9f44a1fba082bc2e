use assert_cmd::prelude::*;
use assert_fs::prelude::*;

use predicates::prelude::*;
use predicates::str::contains;
use serial_test::serial;
use std::process::Command;

const CORPUS: &str = r#"[
  {
    "sessionId": "a1",
    "projectName": "secret-project",
    "startTime": "2025-03-10T09:00:00Z",
    "messages": [
      {"role": "user", "content": "Fix the react component state bug", "timestamp": "2025-03-10T09:00:00Z"},
      {"role": "assistant", "content": "The react hook runs twice", "timestamp": "2025-03-10T09:01:00Z",
       "toolUses": [{"name": "Read"}]}
    ]
  },
  {
    "sessionId": "a2",
    "projectName": "secret-project",
    "startTime": "2025-03-11T10:00:00Z",
    "messages": [
      {"role": "user", "content": "Why does the react effect loop?", "timestamp": "2025-03-11T10:00:00Z"}
    ]
  }
]"#;

/// Helper to create a Command for the `chatlens` binary isolated in a temporary directory.
fn chatlens_cmd(temp: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("chatlens").expect("binary exists");
    cmd.current_dir(temp.path());
    cmd.env("CHATLENS_HISTORY_DIR", temp.path());
    cmd.env_remove("CHATLENS_CONFIG");
    cmd.args(["--utc-offset-minutes", "0"]);
    cmd
}

fn write_corpus(temp: &assert_fs::TempDir) -> std::path::PathBuf {
    let corpus = temp.child("corpus.json");
    corpus.write_str(CORPUS).unwrap();
    corpus.path().to_path_buf()
}

#[test]
#[serial]
fn test_json_report() {
    let temp = assert_fs::TempDir::new().unwrap();
    let corpus = write_corpus(&temp);

    chatlens_cmd(&temp)
        .arg(&corpus)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(contains("\"technology_clusters\"").and(contains("Framework: React")))
        .stdout(contains("\"total_events\": 2"));

    temp.close().unwrap();
}

#[test]
#[serial]
fn test_pretty_report() {
    let temp = assert_fs::TempDir::new().unwrap();
    let corpus = write_corpus(&temp);

    chatlens_cmd(&temp)
        .arg(&corpus)
        .assert()
        .success()
        .stdout(contains("OVERVIEW").and(contains("PERSONA")).and(contains("TECHNOLOGIES")));

    temp.close().unwrap();
}

#[test]
#[serial]
fn test_history_log_is_merged() {
    let temp = assert_fs::TempDir::new().unwrap();
    let corpus = write_corpus(&temp);
    temp.child("history.jsonl")
        .write_str("{\"timestamp\": 1741597200000, \"display\": \"hi\"}\nnot json\n{\"timestamp\": 1741600800000}\n")
        .unwrap();

    chatlens_cmd(&temp)
        .arg(&corpus)
        .args(["--format", "json", "--lookback-days", "0"])
        .assert()
        .success()
        .stdout(contains("\"total_events\": 4"));

    temp.close().unwrap();
}

#[test]
#[serial]
fn test_shareable_hides_project_names() {
    let temp = assert_fs::TempDir::new().unwrap();
    let corpus = write_corpus(&temp);

    chatlens_cmd(&temp)
        .arg(&corpus)
        .args(["--format", "json", "--shareable"])
        .assert()
        .success()
        .stdout(contains("secret-project").not().and(contains("project-1")));

    temp.close().unwrap();
}

#[test]
#[serial]
fn test_config_file_is_applied() {
    let temp = assert_fs::TempDir::new().unwrap();
    let corpus = write_corpus(&temp);
    temp.child("chatlens.yaml").write_str("text:\n  max_words: 1\n  min_frequency: 0.0\n").unwrap();

    chatlens_cmd(&temp)
        .arg(&corpus)
        .args(["--format", "json", "--config", "chatlens.yaml"])
        .assert()
        .success()
        .stdout(contains("\"raw_value\"").count(1));

    temp.close().unwrap();
}

#[test]
#[serial]
fn test_non_array_corpus_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("corpus.json").write_str("{\"sessionId\": \"x\"}").unwrap();

    chatlens_cmd(&temp)
        .arg("corpus.json")
        .assert()
        .failure()
        .stderr(contains("expected an array"));

    temp.close().unwrap();
}

#[test]
#[serial]
fn test_missing_corpus_fails() {
    let temp = assert_fs::TempDir::new().unwrap();

    chatlens_cmd(&temp)
        .arg("missing.json")
        .assert()
        .failure()
        .stderr(contains("Failed to load corpus"));

    temp.close().unwrap();
}
