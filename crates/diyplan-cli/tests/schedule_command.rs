//! Tests for the `diyplan schedule`, `remediate` and `check` commands

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;

fn diyplan_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("target/debug/diyplan")
}

fn run(args: &[&str]) -> Output {
    Command::new(diyplan_binary())
        .args(args)
        .env_remove("DIYPLAN_CONFIG")
        .output()
        .expect("Failed to execute command")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

const BATHROOM: &str = r#"{
    "planningStart": "2025-01-06T17:30:00",
    "targetCompletionDate": "2025-01-07",
    "dropDeadDate": "2025-01-07",
    "timezone": "America/Denver",
    "riskTolerance": "aggressive",
    "tasks": [{"id": "patch-drywall", "title": "Patch drywall",
               "estimatedHours": 4, "minContiguousHours": 2}],
    "workers": [{"id": "sam", "maxTotalHours": 40, "costPerHour": "25",
                 "workingHours": {"start": "09:00", "end": "17:00"}}]
}"#;

const OVER_BUDGET: &str = r#"{
    "planningStart": "2025-01-06T08:00:00",
    "targetCompletionDate": "2025-01-10",
    "dropDeadDate": "2025-01-13",
    "riskTolerance": "aggressive",
    "tasks": [
        {"id": "demo", "estimatedHours": 8, "minContiguousHours": 2},
        {"id": "frame", "estimatedHours": 8, "minContiguousHours": 2, "dependencies": ["demo"]}
    ],
    "workers": [{"id": "sam", "maxTotalHours": 8,
                 "workingHours": {"start": "09:00", "end": "17:00"}}]
}"#;

#[test]
fn schedule_prints_text_table() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "bathroom.json", BATHROOM);

    let output = run(&["schedule", arg(&file)]);
    assert!(output.status.success(), "Command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Schedule (America/Denver)"));
    assert!(stdout.contains("patch-drywall"));
    assert!(stdout.contains("2025-01-07 09:00"), "Should start Tuesday morning");
    assert!(stdout.contains("2025-01-07 13:00"));
    assert!(stdout.contains("confirmed"));
    assert!(stdout.contains("Target met: yes"));
    assert!(stdout.contains("Total cost: 100.00"));
}

#[test]
fn schedule_json_round_trips_through_serde() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "bathroom.json", BATHROOM);
    let out_file = dir.path().join("draft.json");

    let output = run(&["schedule", arg(&file), "-f", "json", "-o", arg(&out_file)]);
    assert!(output.status.success());

    let content = fs::read_to_string(&out_file).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let row = &value["scheduledTasks"][0];
    assert_eq!(row["taskId"], "patch-drywall");
    assert_eq!(row["workerId"], "sam");
    assert_eq!(row["startTime"], "2025-01-07T09:00:00");
    assert_eq!(row["status"], "confirmed");
    assert_eq!(value["timezone"], "America/Denver");
}

#[test]
fn commit_writes_the_draft() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "bathroom.json", BATHROOM);
    let committed = dir.path().join("committed.json");

    let output = run(&["schedule", arg(&file), "--commit", arg(&committed)]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Committed:"));

    let content = fs::read_to_string(&committed).unwrap();
    assert!(content.contains("\"inputsFingerprint\""));
    assert!(content.contains("patch-drywall"));
}

#[test]
fn conflicts_are_reported_with_reason() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "tight.json", OVER_BUDGET);

    let output = run(&["schedule", arg(&file)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("conflict (no worker has enough remaining hours)"));
    assert!(stdout.contains("Conflicts: 1"));
    assert!(stdout.contains("Target met: no"));
}

#[test]
fn remediate_lists_helper_suggestion() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "tight.json", OVER_BUDGET);

    let output = run(&["remediate", arg(&file)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 suggestion(s) for 1 conflict(s)"));
    assert!(stdout.contains("Add helper helper-1"));

    let output = run(&["remediate", arg(&file), "--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["kind"]["kind"], "addHelper");
}

#[test]
fn remediate_without_conflicts_says_so() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "bathroom.json", BATHROOM);

    let output = run(&["remediate", arg(&file)]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("nothing to remediate"));
}

#[test]
fn config_file_shrinks_the_horizon() {
    let dir = tempdir().unwrap();
    // 6h of 4h mornings starting Monday; drop-dead Monday, no overrun allowed
    let file = write(
        dir.path(),
        "late.json",
        r#"{
            "planningStart": "2025-01-06T08:00:00",
            "targetCompletionDate": "2025-01-06",
            "dropDeadDate": "2025-01-06",
            "riskTolerance": "aggressive",
            "tasks": [{"id": "deck", "estimatedHours": 6, "minContiguousHours": 2}],
            "workers": [{"id": "sam", "maxTotalHours": 40,
                         "workingHours": {"start": "09:00", "end": "13:00"}}]
        }"#,
    );
    let config = write(dir.path(), "engine.toml", "overrun_days = 0\n");

    let default = run(&["schedule", arg(&file)]);
    assert!(String::from_utf8_lossy(&default.stdout).contains("finishes after its latest completion"));

    let strict = run(&["schedule", arg(&file), "--config", arg(&config)]);
    assert!(strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stdout)
        .contains("no contiguous window large enough before the horizon ends"));
}

#[test]
fn check_reports_counts() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "bathroom.json", BATHROOM);

    let output = run(&["check", arg(&file)]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("OK: 1 tasks, 1 workers (America/Denver)"));
}

#[test]
fn check_names_the_unknown_dependency() {
    let dir = tempdir().unwrap();
    let file = write(
        dir.path(),
        "ghost.json",
        r#"{
            "planningStart": "2025-01-06T08:00:00",
            "targetCompletionDate": "2025-01-10",
            "dropDeadDate": "2025-01-17",
            "tasks": [{"id": "paint", "estimatedHours": 2, "minContiguousHours": 1,
                       "dependencies": ["prime"]}],
            "workers": [{"id": "sam", "maxTotalHours": 40,
                         "workingHours": {"start": "09:00", "end": "17:00"}}]
        }"#,
    );

    let output = run(&["check", arg(&file)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'paint' depends on 'prime'"), "stderr: {stderr}");
}
