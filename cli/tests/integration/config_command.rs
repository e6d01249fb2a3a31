//! Integration tests for `fleet config` command.
//!
//! All filesystem-touching tests set `FLEET_CONFIG` to a temp path so they
//! never read or write `~/.fleet/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fleet() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fleet"));
    cmd.env("NO_COLOR", "1")
        .env_remove("FLEET_ENDPOINT")
        .env_remove("FLEET_TOKEN")
        .env_remove("FLEET_OWNER");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

#[test]
fn test_config_help_shows_show_and_set_subcommands() {
    fleet()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

// ---------------------------------------------------------------------------
// `fleet config show`
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_no_config_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    fleet()
        .args(["config", "show"])
        .env("FLEET_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("reconcile.max_attempts:"))
        .stdout(predicate::str::contains("100"))
        .stdout(predicate::str::contains("FLEET_CONFIG"));
}

#[test]
fn test_config_show_does_not_create_file() {
    let (_dir, path) = temp_config_path();
    fleet()
        .args(["config", "show"])
        .env("FLEET_CONFIG", &path)
        .assert()
        .success();
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_show_json_hides_token() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "gateway:\n  token: s3cret\n").expect("write config");

    let output = fleet()
        .args(["config", "show", "--json"])
        .env("FLEET_CONFIG", &path)
        .output()
        .expect("run fleet");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("s3cret"), "got: {stdout}");
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["gateway"]["token_set"], true);
    assert_eq!(value["reconcile"]["poll_interval_secs"], 5);
}

// ---------------------------------------------------------------------------
// `fleet config set`
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_persists_value() {
    let (_dir, path) = temp_config_path();
    fleet()
        .args(["config", "set", "reconcile.poll_interval_secs", "2"])
        .env("FLEET_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Set reconcile.poll_interval_secs = 2"));

    let contents = std::fs::read_to_string(&path).expect("config written");
    assert!(contents.contains("poll_interval_secs: 2"), "got: {contents}");
}

#[test]
fn test_config_set_token_is_not_echoed() {
    let (_dir, path) = temp_config_path();
    fleet()
        .args(["config", "set", "gateway.token", "s3cret"])
        .env("FLEET_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("(hidden)"))
        .stdout(predicate::str::contains("s3cret").not());
}

#[cfg(unix)]
#[test]
fn test_config_set_writes_owner_only_file() {
    use std::os::unix::fs::PermissionsExt as _;

    let (_dir, path) = temp_config_path();
    fleet()
        .args(["config", "set", "owner", "alice"])
        .env("FLEET_CONFIG", &path)
        .assert()
        .success();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_config_set_unknown_key_fails() {
    let (_dir, path) = temp_config_path();
    fleet()
        .args(["config", "set", "region", "eu-west-1"])
        .env("FLEET_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting: region"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_invalid_value_fails() {
    let (_dir, path) = temp_config_path();
    fleet()
        .args(["config", "set", "gateway.kind", "grpc"])
        .env("FLEET_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("http, simulated"));
}
