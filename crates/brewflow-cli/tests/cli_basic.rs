//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. All runs use
//! BREWFLOW_ENV=dev so the production config directory is left alone.

use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "brewflow-cli", "--"])
        .args(args)
        .env("BREWFLOW_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_scale_dose_edit() {
    let (stdout, _stderr, code) = run_cli(&["scale", "--dose", "20"]);
    assert_eq!(code, 0, "scale failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("scale output not JSON");
    assert_eq!(parsed["dose_g"], 20.0);
    assert_eq!(parsed["yield_g"], 333.0);
    let targets = parsed["water_targets"].as_array().unwrap();
    assert_eq!(targets.len(), 3);
    assert_eq!(targets[2]["cumulative_g"], 333);
}

#[test]
fn test_scale_yield_edit() {
    let (stdout, _stderr, code) = run_cli(&["scale", "--yield", "500"]);
    assert_eq!(code, 0, "scale failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["yield_g"], 500.0);
    assert_eq!(parsed["dose_g"], 30.0);
}

#[test]
fn test_plan_lists_numbered_steps() {
    let (stdout, _stderr, code) = run_cli(&["plan", "--dose", "20"]);
    assert_eq!(code, 0, "plan failed");
    assert!(stdout.contains("1. "));
    assert!(stdout.contains("Pour 60 g to bloom"));
    assert!(stdout.contains("Total water: 333 g"));
}

#[test]
fn test_plan_json() {
    let (stdout, _stderr, code) = run_cli(&["plan", "--json"]);
    assert_eq!(code, 0, "plan --json failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["steps"].as_array().unwrap().len(), 6);
}

#[test]
fn test_config_list() {
    let (stdout, _stderr, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["profile"]["method"].is_string());
}

#[test]
fn test_config_unknown_key_fails() {
    let (_stdout, stderr, code) = run_cli(&["config", "get", "no_such_key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}
