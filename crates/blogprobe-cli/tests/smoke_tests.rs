//! Smoke tests for the blogprobe CLI

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the blogprobe binary
fn blogprobe() -> Command {
    let mut cmd = Command::cargo_bin("blogprobe").expect("blogprobe binary should exist");
    for var in [
        "BLOGPROBE_SCENARIOS",
        "BLOGPROBE_CONFIG",
        "BLOGPROBE_FRONTEND_URL",
        "BLOGPROBE_BACKEND_URL",
        "BLOGPROBE_TIMEOUT_MS",
        "BLOGPROBE_POLL_INTERVAL_MS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    blogprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    blogprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_no_args_shows_help() {
    blogprobe().assert().failure();
}

#[test]
fn test_run_subcommand_help() {
    blogprobe()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--mock"))
        .stdout(predicate::str::contains("BLOGPROBE_FRONTEND_URL"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_builtin_suite() {
    blogprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blog app > login form is shown"))
        .stdout(predicate::str::contains(
            "Login > fails with wrong credentials",
        ))
        .stdout(predicate::str::contains("when logged in > create and delete blog"));
}

#[test]
fn test_list_with_filter() {
    blogprobe()
        .args(["list", "--filter", "descending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("descending"))
        .stdout(predicate::str::contains("Login >").not());
}

#[test]
fn test_list_invalid_scenario_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.yaml");
    fs::write(&path, "groups: [ { name: x, scenarios: [ { steps: 3 } ] } ]").unwrap();
    blogprobe()
        .args(["list", "--scenarios"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_mock_suite_passes() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.json");
    blogprobe()
        .args(["--color", "never", "run", "--mock", "--poll-interval-ms", "10", "--report"])
        .arg(&report)
        .assert()
        .success()
        .stderr(predicate::str::contains("PASSED 8 scenarios"));
    let json = fs::read_to_string(&report).unwrap();
    assert!(json.contains("\"results\""));
}

#[test]
fn test_run_verbose_prints_run_details() {
    blogprobe()
        .args(["-v", "--color", "never", "run", "--mock", "--filter", "login form"])
        .assert()
        .success()
        .stderr(predicate::str::contains("timeout 10000 ms, poll 100 ms"));
}

#[test]
fn test_run_default_omits_run_details() {
    blogprobe()
        .args(["--color", "never", "run", "--mock", "--filter", "login form"])
        .assert()
        .success()
        .stderr(predicate::str::contains("timeout 10000 ms").not());
}

#[test]
fn test_run_mock_scenario_file_failure_exits_nonzero() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("scenarios.yaml");
    fs::write(
        &path,
        r"
groups:
  - name: Blog app
    scenarios:
      - name: expects a heading that is not there
        steps:
          - { action: expect_visible, text: Welcome back }
",
    )
    .unwrap();
    blogprobe()
        .args(["--color", "never", "run", "--mock", "--timeout-ms", "200", "--scenarios"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FAIL"))
        .stderr(predicate::str::contains("1 of 1 scenario(s) failed"));
}

#[test]
fn test_run_rejects_zero_timeout() {
    blogprobe()
        .args(["run", "--mock", "--timeout-ms", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration"));
}
