//! Corruption recovery tests for the glow binary.
//!
//! These tests verify the system handles:
//! - Corrupted record files (reported, never overwritten)
//! - Stray files in the records directory
//! - Leftover temp files from an interrupted write

use assert_cmd::Command;
use glow_core::{Clock, SystemClock};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("glow"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn today_file() -> String {
    format!("{}.json", SystemClock.today())
}

#[test]
fn test_corrupted_record_reported_not_replaced() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let records = data_dir.join("records");
    fs::create_dir_all(&records).unwrap();

    let record_path = records.join(today_file());
    fs::write(&record_path, "{ invalid json }}}}").expect("Failed to write corrupted record");

    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["water", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Json"));

    assert_eq!(
        fs::read_to_string(&record_path).unwrap(),
        "{ invalid json }}}}"
    );
}

#[test]
fn test_corrupted_past_record_does_not_block_today() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let records = data_dir.join("records");
    fs::create_dir_all(&records).unwrap();
    fs::write(records.join("2026-01-01.json"), "not json").unwrap();

    // Point reads and writes of other days are unaffected
    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["water", "2"])
        .assert()
        .success();

    // The full-history streak scan surfaces the problem
    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .arg("streak")
        .assert()
        .failure();
}

#[test]
fn test_stray_files_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let records = data_dir.join("records");
    fs::create_dir_all(&records).unwrap();

    fs::write(records.join("notes.json"), "{}").unwrap();
    fs::write(records.join(".tmpA1b2C3"), r#"{"date":"2026-01-0"#).unwrap();
    fs::write(records.join("README.txt"), "hello").unwrap();

    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--date")
        .arg("2026-01-05")
        .arg("streak")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current streak: 0 days"));
}

#[test]
fn test_lock_files_ignored_by_reports() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["water", "4"])
        .assert()
        .success();

    assert!(data_dir
        .join("records")
        .join(format!("{}.lock", SystemClock.today()))
        .exists());

    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .arg("export")
        .arg(data_dir.join("out.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 days"));
}

#[test]
fn test_missing_data_dir_is_created() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("does/not/exist");

    cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["exercise", "eye_circle"])
        .assert()
        .success();

    assert!(data_dir.join("records").join(today_file()).exists());
}
