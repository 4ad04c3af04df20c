//! Integration tests for the `fanlink` binary.
//!
//! Parsing, help, completions and config handling run without a
//! controller; request commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `fanlink` binary with env isolation.
///
/// Clears all `FANLINK_*` variables and points config directories at
/// `home` so tests never touch the user's real configuration.
fn fanlink_cmd_in(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fanlink");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("FANLINK_PROFILE")
        .env_remove("FANLINK_URL")
        .env_remove("FANLINK_OUTPUT")
        .env_remove("FANLINK_INSECURE")
        .env_remove("FANLINK_TIMEOUT")
        .env_remove("FANLINK_BMC_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn fanlink_cmd() -> assert_cmd::Command {
    fanlink_cmd_in(std::path::Path::new("/tmp/fanlink-cli-test-nonexistent"))
}

/// Run a blocking command without stalling the mock server's runtime.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let output = fanlink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage") || stdout(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    fanlink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("curve"))
            .and(predicate::str::contains("history"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("restore-auto")),
    );
}

#[test]
fn completions_zsh() {
    fanlink_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn status_without_controller_explains_setup() {
    fanlink_cmd()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No controller configured"));
}

#[test]
fn invalid_history_range_is_a_usage_error() {
    fanlink_cmd()
        .args(["--url", "http://127.0.0.1:9", "history", "--range", "2h"])
        .assert()
        .code(2);
}

#[test]
fn malformed_curve_points_are_rejected() {
    fanlink_cmd()
        .args(["--url", "http://127.0.0.1:9", "curve", "set", "30-20"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("temp:speed"));
}

#[test]
fn unreachable_controller_reports_failed_request() {
    fanlink_cmd()
        .args(["--url", "http://127.0.0.1:9", "--timeout", "2", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("status request failed"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_show_without_file_uses_defaults() {
    fanlink_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reconnect_delay_ms = 3000"));
}

#[test]
fn config_init_then_profiles() {
    let home = tempfile::tempdir().unwrap();

    fanlink_cmd_in(home.path())
        .args(["config", "init", "http://10.0.0.5:8000", "--name", "rack"])
        .assert()
        .success();

    fanlink_cmd_in(home.path())
        .args(["--output", "json-compact", "config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"name":"rack","url":"http://10.0.0.5:8000","default":"*"}"#,
        ));
}

#[test]
fn config_init_rejects_bad_url() {
    let home = tempfile::tempdir().unwrap();
    fanlink_cmd_in(home.path())
        .args(["config", "init", "ftp://fans.lan"])
        .assert()
        .code(2);
}

// ── Against a mock controller ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn status_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpu_temp": 52.5,
            "fan_speed": 1800,
            "power": 95.0,
            "control_mode": "manual",
            "last_update": "2024-05-01T12:00:00Z"
        })))
        .mount(&server)
        .await;

    let mut cmd = fanlink_cmd();
    cmd.args(["--url", &server.uri(), "--output", "json", "status"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["fan_speed"], 1800.0);
    assert_eq!(value["control_mode"], "manual");
}

#[tokio::test(flavor = "multi_thread")]
async fn curve_set_sends_points_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/curve"))
        .and(body_json(json!({
            "points": [{ "x": 30.0, "y": 20.0 }, { "x": 70.0, "y": 100.0 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = fanlink_cmd();
    cmd.args(["--url", &server.uri(), "curve", "set", "30:20,70:100"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Fan curve saved (2 points)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn history_failure_shows_controller_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/history"))
        .and(query_param("range", "6h"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "detail": "history store offline" })),
        )
        .mount(&server)
        .await;

    let mut cmd = fanlink_cmd();
    cmd.args(["--url", &server.uri(), "history", "--range", "6h"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("history store offline"));
}

#[tokio::test(flavor = "multi_thread")]
async fn logs_pass_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("level", "ERROR"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{ "level": "ERROR", "time": "2024-05-01 12:00:00", "message": "fan stalled" }]
        })))
        .mount(&server)
        .await;

    let mut cmd = fanlink_cmd();
    cmd.args([
        "--url",
        &server.uri(),
        "--output",
        "json-compact",
        "logs",
        "--level",
        "ERROR",
        "--limit",
        "5",
    ]);
    let output = run(cmd).await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("fan stalled"));
}
