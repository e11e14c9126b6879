//! CLI integration tests
//!
//! Drive the `dsr-audit` binary over JSON fixtures written to a temp dir.

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dsr-audit"))
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn pair(dir: &TempDir, old: Value, new: Value) -> (String, String) {
    let old = write_json(dir, "old.json", &old);
    let new = write_json(dir, "new.json", &new);
    (
        old.to_str().unwrap().to_string(),
        new.to_str().unwrap().to_string(),
    )
}

#[test]
fn test_diff_prints_change_records() {
    let dir = TempDir::new().unwrap();
    let (old, new) = pair(
        &dir,
        json!({"status": "Pending", "detailed_status": "A", "tags": ["x", "y"]}),
        json!({"status": "Completed", "detailed_status": "B", "tags": ["x"]}),
    );

    let output = run(&["diff", &old, &new, "--sorted"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let records: Value = serde_json::from_slice(&output.stdout).unwrap();
    let paths: Vec<&str> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["fieldPath"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["status", "tags.1"]);
    assert_eq!(records[1]["changeType"], "REMOVED");
}

#[test]
fn test_diff_with_config_file() {
    let dir = TempDir::new().unwrap();
    let (old, new) = pair(
        &dir,
        json!({"status": "Pending", "remarks": "a"}),
        json!({"status": "Pending", "remarks": "b"}),
    );
    let config = dir.path().join("engine.toml");
    fs::write(&config, "excluded_fields = [\"remarks\"]\n").unwrap();

    let output = run(&["diff", &old, &new, "--config", config.to_str().unwrap()]);
    assert!(output.status.success());
    let records: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records, json!([]));
}

#[test]
fn test_equivalent_exit_codes() {
    let dir = TempDir::new().unwrap();
    let (old, new) = pair(
        &dir,
        json!({"status": "Pending", "updatedAt": "t1"}),
        json!({"status": "Pending", "updatedAt": "t2"}),
    );
    let output = run(&["equivalent", &old, &new]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "true");

    let (old, new) = pair(&dir, json!({"status": "Pending"}), json!({"status": "Done"}));
    let output = run(&["equivalent", &old, &new]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "false");
}

#[test]
fn test_invalid_input_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("broken.json");
    fs::write(&old, "{not json").unwrap();
    let new = write_json(&dir, "new.json", &json!({}));

    let output = run(&["diff", old.to_str().unwrap(), new.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid JSON"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let (old, new) = pair(&dir, json!({}), json!({}));
    let config = dir.path().join("engine.toml");
    fs::write(&config, "max_depth = 0\n").unwrap();

    let output = run(&["equivalent", &old, &new, "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_CONFIG"));
}

#[test]
fn test_record_appends_entry_to_trail() {
    let dir = TempDir::new().unwrap();
    let trail = dir.path().join("trail.jsonl");
    let trail_arg = trail.to_str().unwrap();
    let (old, new) = pair(
        &dir,
        json!({"job_no": "EXP/0042", "year": "24-25", "status": "Pending"}),
        json!({"job_no": "EXP/0042", "year": "24-25", "status": "Completed"}),
    );

    let output = run(&[
        "record", &old, &new,
        "--trail", trail_arg,
        "--document-type", "ExportJob",
        "--user", "asha",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = fs::read_to_string(&trail).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    let entry: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry["action"], "UPDATE");
    assert_eq!(entry["job_no"], "EXP/0042");
    assert_eq!(entry["username"], "asha");
    assert_eq!(entry["changes"][0]["fieldPath"], "status");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        entry["entryId"].as_str().unwrap()
    );

    // equivalent snapshots leave the trail untouched
    let output = run(&[
        "record", &new, &new,
        "--trail", trail_arg,
        "--document-type", "ExportJob",
    ]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "unchanged");
    assert_eq!(fs::read_to_string(&trail).unwrap().lines().count(), 1);
}
