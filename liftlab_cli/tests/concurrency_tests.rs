//! Concurrency tests for the liftlab binary.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the results log simultaneously (file locking)
//! - Read history while sets are being logged
//! - Advance the program state without corrupting it

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const PROGRAM_JSON: &str = r#"{
    "name": "Concurrency Program",
    "deload_week": 4,
    "workouts": [
        {
            "id": 1,
            "name": "Pull",
            "lifts": [
                {
                    "id": 30,
                    "workout_id": 1,
                    "lift_id": 6,
                    "position": 0,
                    "progression_scheme": "double_progression",
                    "rep_range_bottom": 6,
                    "rep_range_top": 10,
                    "rpe_target": 8,
                    "sets": { "kind": "standard", "set_count": 8 }
                }
            ]
        }
    ]
}"#;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("liftlab"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("program.json"), PROGRAM_JSON)
        .expect("Failed to write program");
    temp_dir
}

fn log_set(data_dir: &Path, set: u32) {
    cli(data_dir)
        .args(["log", "--workout", "1", "--lift", "6"])
        .args(["--set", &set.to_string()])
        .args(["--weight", "20", "--reps", "8", "--rpe", "8"])
        .assert()
        .success();
}

#[test]
fn test_concurrent_set_logging() {
    let temp_dir = setup_test_dir();
    let data_dir: PathBuf = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..8)
        .map(|set| {
            let data_dir = data_dir.clone();
            thread::spawn(move || log_set(&data_dir, set))
        })
        .collect();

    for handle in handles {
        handle.join().expect("Logging thread panicked");
    }

    // Every line is a complete result
    let log_content = fs::read_to_string(data_dir.join("log/set_results.log"))
        .expect("Failed to read results log");
    let lines: Vec<&str> = log_content.lines().collect();
    assert_eq!(lines.len(), 8, "Expected 8 results, got {}", lines.len());
    for line in lines {
        serde_json::from_str::<serde_json::Value>(line).expect("Torn log line");
    }
}

#[test]
fn test_concurrent_reads_and_writes() {
    let temp_dir = setup_test_dir();
    let data_dir: PathBuf = temp_dir.path().to_path_buf();

    log_set(&data_dir, 0);

    let writer = {
        let data_dir = data_dir.clone();
        thread::spawn(move || {
            for set in 1..4 {
                thread::sleep(Duration::from_millis(5));
                log_set(&data_dir, set);
            }
        })
    };

    let reader = {
        let data_dir = data_dir.clone();
        thread::spawn(move || {
            for _ in 0..3 {
                cli(&data_dir).arg("prescribe").assert().success();
            }
        })
    };

    writer.join().expect("Writer panicked");
    reader.join().expect("Reader panicked");

    let log_content = fs::read_to_string(data_dir.join("log/set_results.log")).unwrap();
    assert_eq!(log_content.lines().count(), 4);
}

#[test]
fn test_sequential_advances_keep_state_valid() {
    let temp_dir = setup_test_dir();
    let data_dir: PathBuf = temp_dir.path().to_path_buf();

    for _ in 0..6 {
        cli(&data_dir).arg("advance").assert().success();
    }

    let state: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(data_dir.join("log/state.json")).expect("Failed to read state"),
    )
    .expect("State is not valid JSON");

    assert_eq!(state["current_mesocycle"], 1);
    assert_eq!(state["current_microcycle"], 2);
}
