use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

#[allow(deprecated)]
fn brief() -> Command {
    Command::cargo_bin("brief").expect("binary")
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn score_reports_every_signal() {
    let report = json_stdout(brief().args([
        "--quiet",
        "score",
        "OpenAI launched GPT-5 with 70B parameters achieving 94.5% on MMLU. \
         The model is now generally available at $0.003 per 1K tokens.",
    ]));
    assert_eq!(report["gates"]["event"]["passed"], true);
    assert_eq!(report["relevance"]["relevant"], true);
    assert_eq!(report["primary"]["text"], "GPT-5");
    assert_eq!(report["anchors"]["has_anchor"], true);
    assert!(report["density"]["score"].as_u64().unwrap() > 0);
}

#[test]
fn score_reads_stdin() {
    let report = json_stdout(
        brief()
            .args(["--quiet", "score"])
            .write_stdin("Weekly roundup. Subscribe and sign in to see top links for this week."),
    );
    assert_eq!(report["gates"]["signal"]["passed"], false);
    assert_eq!(report["relevance"]["relevant"], false);
}

#[test]
fn score_refuses_empty_input() {
    brief()
        .args(["--quiet", "score"])
        .write_stdin("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to score"));
}

#[test]
fn schema_describes_the_payload() {
    let schema = json_stdout(brief().args(["--quiet", "schema"]));
    let properties = schema["properties"].as_object().expect("properties");
    for field in ["lead", "impact", "actions", "risks", "proof_line", "title_clean", "bucket"] {
        assert!(properties.contains_key(field), "missing {field}");
    }
    assert_eq!(schema["x-schema-version"], 1);
}

#[test]
fn config_dump_round_trips_through_a_file() {
    let output = brief()
        .args(["--quiet", "config"])
        .output()
        .expect("command run");
    assert!(output.status.success());
    let dumped = String::from_utf8(output.stdout).unwrap();
    assert!(dumped.contains("dedup_threshold"));

    let temp = tempdir().unwrap();
    let path = temp.path().join("brief.toml");
    fs::write(&path, &dumped).unwrap();
    brief()
        .args(["--quiet", "config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::eq(dumped.as_str()));
}

#[test]
fn partial_config_overrides_defaults() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("brief.toml");
    fs::write(&path, "[compaction]\ndedup_threshold = 0.9\n").unwrap();
    brief()
        .args(["--quiet", "config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("dedup_threshold = 0.9"));
}
