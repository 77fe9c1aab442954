//! Exit code integration tests
//!
//! ## Exit Code Contract
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | A schedule was computed (conflicts are data, not failures) |
//! | 1 | Fatal input error, unreadable file, or failed commit |

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn diyplan_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("target/debug/diyplan")
}

fn write_request(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn run(args: &[&str], file: &Path) -> i32 {
    let status = Command::new(diyplan_binary())
        .args(args)
        .arg(file)
        .status()
        .expect("failed to execute diyplan");
    status.code().unwrap_or(-1)
}

const FEASIBLE: &str = r#"{
    "planningStart": "2025-01-06T08:00:00",
    "targetCompletionDate": "2025-01-10",
    "dropDeadDate": "2025-01-17",
    "riskTolerance": "aggressive",
    "tasks": [{"id": "paint", "estimatedHours": 4, "minContiguousHours": 2}],
    "workers": [{"id": "sam", "maxTotalHours": 40,
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

const CYCLIC: &str = r#"{
    "planningStart": "2025-01-06T08:00:00",
    "targetCompletionDate": "2025-01-10",
    "dropDeadDate": "2025-01-17",
    "tasks": [
        {"id": "a", "estimatedHours": 1, "minContiguousHours": 1, "dependencies": ["b"]},
        {"id": "b", "estimatedHours": 1, "minContiguousHours": 1, "dependencies": ["a"]}
    ],
    "workers": [{"id": "sam", "maxTotalHours": 40,
                 "workingHours": {"start": "09:00", "end": "17:00"}}]
}"#;

// =============================================================================
// Success
// =============================================================================

#[test]
fn exit_0_feasible_schedule() {
    let dir = tempdir().unwrap();
    let file = write_request(dir.path(), "ok.json", FEASIBLE);
    assert_eq!(run(&["schedule"], &file), 0);
    assert_eq!(run(&["check"], &file), 0);
}

#[test]
fn exit_0_schedule_with_conflicts() {
    let dir = tempdir().unwrap();
    let file = write_request(dir.path(), "tight.json", OVER_BUDGET);
    assert_eq!(run(&["schedule"], &file), 0, "conflicts are data, not failures");
    assert_eq!(run(&["schedule", "--format", "json"], &file), 0);
    assert_eq!(run(&["remediate"], &file), 0);
}

// =============================================================================
// Failure
// =============================================================================

#[test]
fn exit_1_cyclic_dependencies() {
    let dir = tempdir().unwrap();
    let file = write_request(dir.path(), "cycle.json", CYCLIC);
    assert_eq!(run(&["check"], &file), 1);
    assert_eq!(run(&["schedule"], &file), 1);
    assert_eq!(run(&["schedule", "--format", "json"], &file), 1);
}

#[test]
fn exit_1_missing_file() {
    let dir = tempdir().unwrap();
    assert_eq!(run(&["schedule"], &dir.path().join("absent.json")), 1);
}

#[test]
fn exit_1_malformed_json() {
    let dir = tempdir().unwrap();
    let file = write_request(dir.path(), "bad.json", "{ not json");
    assert_eq!(run(&["check"], &file), 1);
}
