//! CLI end-to-end tests
//!
//! Tests for the sheetcast command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const ENV_VARS: &[&str] = &[
    "SHEET_ID",
    "SHEET_TAB",
    "GOOGLE_ACCESS_TOKEN",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "BATCH_SIZE",
    "PACING_MS",
    "WORK_DIR",
    "FFMPEG_PATH",
];

/// Get a command for the sheetcast binary with a clean environment: no
/// settings variables, and a home and working directory without config files.
#[allow(deprecated)]
fn sheetcast_cmd(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("sheetcast").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home).current_dir(home);
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetcast"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_flag() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetcast"));
}

#[test]
fn test_cli_version_command() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_run_help() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-rows"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_cli_check_tools_command() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"));
}

#[test]
fn test_cli_validate_reports_missing_settings() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SHEET_ID"))
        .stderr(predicate::str::contains("TELEGRAM_BOT_TOKEN"));
}

#[test]
fn test_cli_run_without_settings_fails_before_any_request() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .args(["run", "--max-rows", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_cli_validate_with_config_and_env() {
    let home = tempdir().unwrap();
    let config_path = home.path().join("sheetcast.toml");
    fs::write(
        &config_path,
        r#"
[sheet]
spreadsheet_id = "1SheetFromFile"
tab = "Queue"

[telegram]
chat_id = "-100123"

[batch]
max_rows = 5
pacing_ms = 250
"#,
    )
    .unwrap();

    sheetcast_cmd(home.path())
        .args(["--config", config_path.to_str().unwrap(), "validate"])
        .env("GOOGLE_ACCESS_TOKEN", "ya29.very-secret-token")
        .env("TELEGRAM_BOT_TOKEN", "987654:SECRET")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("1SheetFromFile"))
        .stdout(predicate::str::contains("Queue"))
        .stdout(predicate::str::contains("Row quota: 5"))
        .stdout(predicate::str::contains("very-secret-token").not())
        .stdout(predicate::str::contains("SECRET").not());
}

#[test]
fn test_cli_env_overrides_config_file() {
    let home = tempdir().unwrap();
    fs::write(
        home.path().join("sheetcast.toml"),
        r#"
[sheet]
spreadsheet_id = "1SheetFromFile"

[batch]
max_rows = 5
"#,
    )
    .unwrap();

    sheetcast_cmd(home.path())
        .arg("validate")
        .env("SHEET_ID", "1SheetFromEnv")
        .env("BATCH_SIZE", "3")
        .env("GOOGLE_ACCESS_TOKEN", "ya29.token")
        .env("TELEGRAM_BOT_TOKEN", "987654:SECRET")
        .env("TELEGRAM_CHAT_ID", "-100123")
        .assert()
        .success()
        .stdout(predicate::str::contains("1SheetFromEnv"))
        .stdout(predicate::str::contains("Row quota: 3"));
}

#[test]
fn test_cli_rejects_malformed_batch_size() {
    let home = tempdir().unwrap();
    sheetcast_cmd(home.path())
        .arg("validate")
        .env("BATCH_SIZE", "lots")
        .assert()
        .failure()
        .stderr(predicate::str::contains("BATCH_SIZE"));
}
