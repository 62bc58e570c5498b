//! CLI integration tests for mysql-dump.
//!
//! These tests cover argument parsing, help output and exit codes for
//! configuration errors. None of them needs a running MySQL server.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the mysql-dump binary.
fn cmd() -> Command {
    Command::cargo_bin("mysql-dump").unwrap()
}

fn config_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", yaml).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("order"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_export_subcommand_help() {
    cmd()
        .args(["export", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--database"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--file-name"))
        .stdout(predicate::str::contains("--compress"))
        .stdout(predicate::str::contains("--stdout"));
}

#[test]
fn test_order_subcommand_help() {
    cmd()
        .args(["order", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--database"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mysql-dump"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_timeout_default() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("[default: 0]"));
}

#[test]
fn test_config_default() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_logging_flags_exist() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_missing_subcommand_fails() {
    cmd().assert().failure();
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not a config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let file = config_file("source: [\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "export"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_user_exits_with_code_1() {
    let file = config_file("source:\n  host: localhost\n  database: shop\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "order"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("source.user"));
}

#[test]
fn test_zero_chunk_size_exits_with_code_1() {
    let file = config_file(
        "source:\n  host: localhost\n  database: shop\n  user: root\nexport:\n  max_rows_per_insert: 0\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "export"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_rows_per_insert"));
}

#[test]
fn test_bad_file_name_override_exits_with_code_1() {
    let file = config_file("source:\n  host: localhost\n  database: shop\n  user: root\n");

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "export",
            "--file-name",
            "../escape",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("output.file_name"));
}

#[test]
fn test_unknown_cycle_policy_exits_with_code_1() {
    let file = config_file(
        "source:\n  host: localhost\n  database: shop\n  user: root\nexport:\n  cycle_policy: sometimes\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "order"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_database_exits_with_code_1() {
    let file = config_file("source:\n  host: 127.0.0.1\n  port: 1\n  user: root\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "order"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("source.database"));
}

#[test]
fn test_database_flag_supplies_missing_database() {
    // Nothing listens on port 1, so the run fails after validation.
    let file = config_file("source:\n  host: 127.0.0.1\n  port: 1\n  user: root\n");

    for command in ["export", "order"] {
        cmd()
            .args([
                "--config",
                file.path().to_str().unwrap(),
                "--timeout",
                "2",
                command,
                "--database",
                "shop",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("source.database").not())
            .stderr(predicate::str::contains("Configuration error").not());
    }
}
