//! Binary behavior that does not need the terminal UI.

mod common;

use assert_cmd::Command;
use common::Fixture;
use predicates::prelude::*;
use tempfile::TempDir;

fn gitsync() -> Command {
    let mut cmd = Command::cargo_bin("gitsync").unwrap();
    cmd.env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
    cmd
}

#[test]
fn test_outside_repository_exits_with_error() {
    let dir = TempDir::new().unwrap();
    gitsync()
        .current_dir(dir.path())
        .env("GIT_CEILING_DIRECTORIES", dir.path().parent().unwrap())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not inside a Git repository"));
}

#[test]
fn test_version_flag() {
    gitsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gitsync"));
}

#[test]
fn test_missing_explicit_config_fails_before_ui() {
    let fixture = Fixture::new();
    gitsync()
        .current_dir(&fixture.work)
        .args(["--config", "missing.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_write_config_writes_detected_settings() {
    let fixture = Fixture::new();
    let log = fixture.root.join("gitsync.log");
    gitsync()
        .current_dir(&fixture.work)
        .arg("--write-config")
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains(".gitsync.yaml"));

    let written = std::fs::read_to_string(fixture.work.join(".gitsync.yaml")).unwrap();
    assert!(written.contains("base_branch: main"));
    assert!(written.contains("upstream_remote: upstream"));
    assert!(written.contains("origin_remote: origin"));
    assert!(log.exists());
}
