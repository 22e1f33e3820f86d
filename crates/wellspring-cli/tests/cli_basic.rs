//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "wellspring-cli", "--"])
        .args(args)
        .env("WELLSPRING_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_exercises_lists_presets() {
    let (stdout, _stderr, code) = run_cli(&["exercises"]);
    assert_eq!(code, 0, "exercises failed");
    assert!(stdout.contains("box-breathing"));
    assert!(stdout.contains("body-scan"));
}

#[test]
fn test_insights_returns_json() {
    let (stdout, _stderr, code) = run_cli(&["--user", "e2e-insights", "insights"]);
    assert_eq!(code, 0, "insights failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert!(parsed.get("mood_trend_percent").is_some());
    assert!(parsed.get("activity_level_percent").is_some());
}

#[test]
fn test_new_user_stats_are_zero() {
    let (stdout, _stderr, code) = run_cli(&["--user", "e2e-fresh", "stats", "streak"]);
    assert_eq!(code, 0, "stats streak failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert_eq!(parsed["total_sessions"], 0);
}

#[test]
fn test_session_status_without_session() {
    let (stdout, _stderr, code) = run_cli(&["--user", "e2e-nosession", "session", "status"]);
    assert_eq!(code, 0, "session status failed");
    assert!(stdout.contains("none"));
}

#[test]
fn test_session_start_rejects_unknown_preset() {
    let (_stdout, stderr, code) = run_cli(&[
        "--user",
        "e2e-bad",
        "session",
        "start",
        "--exercise",
        "does-not-exist",
    ]);
    assert_ne!(code, 0, "unknown preset unexpectedly accepted");
    assert!(stderr.contains("unknown exercise preset"));
}

#[test]
fn test_watch_once_exits_cleanly() {
    let (stdout, _stderr, code) = run_cli(&["--user", "e2e-watch", "watch", "--once"]);
    assert_eq!(code, 0, "watch --once failed");
    // First poll after priming sees no movement.
    assert_eq!(stdout.trim(), "");
}

#[test]
fn test_config_show() {
    let (stdout, _stderr, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    assert!(parsed["goals"]["weekly_sessions"].is_number());
}
