//! Binary-level checks of the usage surface: help output, exit-code
//! discipline, and the error shapes commands produce before any API call.
//!
//! Every command points the configuration and credential stores at a
//! throwaway directory so the suite never touches real state or the
//! network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TEST_PROJECT: &str = "a6b4c2de-39a2-4d3f-b3a1-6e1e7c3a9f10";
const TEST_VOLUME: &str = "0b54c3f1-8e9d-4a2b-bc3d-4e5f6a7b8c9d";
const TEST_INTAKE: &str = "52f3ac1e-7d4b-49c2-8e5f-1a2b3c4d5e6f";

const NIMBUS_ENV_VARS: [&str; 8] = [
    "NIMBUS_PROJECT_ID",
    "NIMBUS_REGION",
    "NIMBUS_VERBOSITY",
    "NIMBUS_AUTH_FLOW",
    "NIMBUS_TOKEN_STORAGE",
    "NIMBUS_VOLUME_CUSTOM_ENDPOINT",
    "NIMBUS_DATABASE_CUSTOM_ENDPOINT",
    "NIMBUS_INTAKE_CUSTOM_ENDPOINT",
];

/// A nimbus command with stores isolated under `home`.
fn nimbus(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("nimbus").unwrap();
    for var in NIMBUS_ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"));
    cmd
}

fn write_service_account_credentials(home: &TempDir) {
    let dir = home.path().join("config").join("nimbus");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("credentials.json"),
        r#"{"flow": "service_account_token", "service_account_token": "test-token"}"#,
    )
    .unwrap();
}

#[test]
fn test_help_lists_services_and_exits_zero() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("volume"))
        .stdout(predicate::str::contains("database"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn test_leaf_help_shows_flags_and_examples() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["volume", "create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--availability-zone"))
        .stdout(predicate::str::contains("--project-id"))
        .stdout(predicate::str::contains("Examples:"));
}

#[test]
fn test_unknown_command_exits_two_with_token() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .arg("volmue")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown command: `volmue`"))
        .stderr(predicate::str::contains("--help"));
}

#[test]
fn test_aggregator_with_unknown_verb_exits_two() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["volume", "frobnicate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn test_missing_required_flag_exits_two() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["volume", "create", "--project-id", TEST_PROJECT, "--size", "64"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("availability-zone"));
}

#[test]
fn test_invalid_uuid_positional_exits_two() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["volume", "describe", "not-a-uuid", "--project-id", TEST_PROJECT])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Argument `VOLUME_ID`"));
}

#[test]
fn test_missing_project_exits_two_with_guidance() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["volume", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Project ID is required"));
}

#[test]
fn test_empty_update_exits_two_before_any_call() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args([
            "intake",
            "user",
            "update",
            TEST_VOLUME,
            "--intake-id",
            TEST_INTAKE,
            "--project-id",
            TEST_PROJECT,
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "At least one field must be specified to update.",
        ));
}

#[test]
fn test_nonpositive_limit_exits_two() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args([
            "volume",
            "list",
            "--limit",
            "0",
            "--project-id",
            TEST_PROJECT,
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Flag `limit`"));
}

#[test]
fn test_unauthenticated_command_exits_one() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args([
            "volume",
            "create",
            "--availability-zone",
            "eu01-1",
            "--size",
            "64",
            "--project-id",
            TEST_PROJECT,
            "--region",
            "eu01",
            "--assume-yes",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn test_prompt_without_tty_cancels_before_submit() {
    let home = TempDir::new().unwrap();
    write_service_account_credentials(&home);
    nimbus(&home)
        .args([
            "volume",
            "delete",
            TEST_VOLUME,
            "--project-id",
            TEST_PROJECT,
            "--region",
            "eu01",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cancelled."));
}

#[test]
fn test_beta_tree_exposes_the_same_validation() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["beta", "volume", "describe", "not-a-uuid", "--project-id", TEST_PROJECT])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Argument `VOLUME_ID`"));
}

#[test]
fn test_config_set_and_list_round_trip() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["config", "set", "region", "eu01"])
        .assert()
        .success();
    nimbus(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("region"))
        .stdout(predicate::str::contains("eu01"))
        .stdout(predicate::str::contains("file"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["config", "set", "favourite_color", "green"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown configuration key"));
}

#[test]
fn test_config_set_validates_values() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["config", "set", "region", "europe"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("region"));
}

#[test]
fn test_config_list_json_is_parseable_and_table_free() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["config", "set", "region", "eu01"])
        .assert()
        .success();
    let output = nimbus(&home)
        .args(["config", "list", "--output-format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert!(entries.iter().any(|e| e["key"] == "region"));
    assert!(!stdout.contains('│'), "structured output must not contain table borders");
}

#[test]
fn test_config_output_format_none_writes_nothing() {
    let home = TempDir::new().unwrap();
    nimbus(&home)
        .args(["config", "list", "--output-format", "none"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_auth_login_stores_and_logout_removes_credentials() {
    let home = TempDir::new().unwrap();
    let credential_file = home
        .path()
        .join("config")
        .join("nimbus")
        .join("credentials.json");

    let output = nimbus(&home)
        .args(["auth", "login", "--service-account-token", "super-secret-token"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(credential_file.exists());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(
        !stdout.contains("super-secret-token"),
        "credentials must never reach stdout"
    );

    nimbus(&home).args(["auth", "logout"]).assert().success();
    assert!(!credential_file.exists());
}
