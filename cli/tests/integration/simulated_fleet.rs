//! End-to-end runs against the simulated control plane.
//!
//! Each process starts from the same four demo instances, so commands can
//! be checked without a network.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STOPPED: &str = "i-987654321fedcba";
const RUNNING: &str = "i-abcdef123456789";
const TERMINATED: &str = "i-000000000000000";

/// A config dir with a one-second poll interval.
fn fast_config() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "reconcile:\n  max_attempts: 10\n  poll_interval_secs: 1\n",
    )
    .expect("write config");
    let path = path.to_string_lossy().into_owned();
    (dir, path)
}

fn fleet(config: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fleet"));
    cmd.env("NO_COLOR", "1")
        .env("FLEET_CONFIG", config)
        .env_remove("FLEET_ENDPOINT")
        .env_remove("FLEET_TOKEN")
        .args(["--simulate", "--owner", "me"]);
    cmd
}

fn json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_list_json_shows_demo_instances() {
    let (_dir, config) = fast_config();
    let output = fleet(&config)
        .args(["list", "--json"])
        .output()
        .expect("run fleet");

    assert!(output.status.success());
    let value = json(&output);
    let instances = value["instances"].as_array().unwrap();
    assert_eq!(instances.len(), 4);
    assert_eq!(instances[1]["id"], STOPPED);
    assert_eq!(instances[1]["state"], "stopped");
}

#[test]
fn test_list_state_filter() {
    let (_dir, config) = fast_config();
    let output = fleet(&config)
        .args(["list", "--state", "running", "--json"])
        .output()
        .expect("run fleet");

    let value = json(&output);
    let instances = value["instances"].as_array().unwrap();
    assert_eq!(instances.len(), 2);
    assert!(instances.iter().all(|i| i["state"] == "running"));
}

#[test]
fn test_list_human_shows_table() {
    let (_dir, config) = fast_config();
    fleet(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("ID"))
        .stdout(predicate::str::contains("Blue Screen"))
        .stdout(predicate::str::contains("Shutting Down").not());
}

#[test]
fn test_start_stopped_instance_converges() {
    let (_dir, config) = fast_config();
    let output = fleet(&config)
        .args(["start", STOPPED, "--json"])
        .output()
        .expect("run fleet");

    assert!(output.status.success(), "{output:?}");
    let value = json(&output);
    assert_eq!(value["instance"], STOPPED);
    assert_eq!(value["command"], "start");
    assert_eq!(value["outcome"], "converged");
    assert_eq!(value["state"], "running");
}

#[test]
fn test_stop_running_instance_converges() {
    let (_dir, config) = fast_config();
    fleet(&config)
        .args(["stop", RUNNING])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{RUNNING} is Stopped")));
}

#[test]
fn test_terminate_with_yes_skips_prompt() {
    let (_dir, config) = fast_config();
    let output = fleet(&config)
        .args(["terminate", RUNNING, "--yes", "--json"])
        .output()
        .expect("run fleet");

    assert!(output.status.success(), "{output:?}");
    assert_eq!(json(&output)["outcome"], "converged");
}

#[test]
fn test_command_on_terminated_instance_fails_with_json_error() {
    let (_dir, config) = fast_config();
    let output = fleet(&config)
        .args(["start", TERMINATED, "--json"])
        .output()
        .expect("run fleet");

    assert!(!output.status.success());
    let value = json(&output);
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "UNKNOWN");
}

#[test]
fn test_unknown_instance_is_invalid_parameter() {
    let (_dir, config) = fast_config();
    fleet(&config)
        .args(["stop", "i-doesnotexist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid Parameter Error"));
}

#[test]
fn test_malformed_instance_id_is_rejected_before_dispatch() {
    let (_dir, config) = fast_config();
    fleet(&config)
        .args(["start", "i-bad id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid instance ID"));
}

#[test]
fn test_describe_includes_capabilities() {
    let (_dir, config) = fast_config();
    let output = fleet(&config)
        .args(["describe", STOPPED, "--json"])
        .output()
        .expect("run fleet");

    assert!(output.status.success(), "{output:?}");
    let value = json(&output);
    assert_eq!(value["instance"]["name"], "Blue Screen");
    assert!(value["summary"].as_str().unwrap().contains("t3a.xlarge"));
}
