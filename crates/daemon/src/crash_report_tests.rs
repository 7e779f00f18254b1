// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn append_error_line_creates_and_appends_to_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    append_error_line(dir.path(), 1_000, "first failure");
    append_error_line(dir.path(), 2_000, "second failure");

    let contents = std::fs::read_to_string(dir.path().join("errors.jsonl")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["message"], serde_json::json!("first failure"));
    assert_eq!(first["timestamp_ms"], serde_json::json!(1000));
}

#[test]
fn write_crash_report_writes_named_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_crash_report(dir.path(), 42_000, "asset root unwritable").unwrap();
    assert_eq!(path, dir.path().join("crash-report-42000.json"));
    let body: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(body["reason"], serde_json::json!("asset root unwritable"));
    assert_eq!(body["timestamp_ms"], serde_json::json!(42000));
}

#[test]
fn write_crash_report_creates_missing_state_dir() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested").join("state");
    let path = write_crash_report(&nested, 1, "store unopenable").unwrap();
    assert!(path.exists());
}
