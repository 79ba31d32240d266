//! End-to-end CLI tests for the rapidshare binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with an empty config home, so no user config is read.
fn rapidshare(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rapidshare").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let config_home = TempDir::new().unwrap();
    rapidshare(&config_home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("RapidShare"))
        .stdout(predicate::str::contains("check"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let config_home = TempDir::new().unwrap();
    rapidshare(&config_home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let config_home = TempDir::new().unwrap();
    rapidshare(&config_home)
        .args(["--invalid-flag", "account"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_check_without_urls_fails() {
    let config_home = TempDir::new().unwrap();
    rapidshare(&config_home)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("URLS"));
}

#[test]
fn test_binary_download_without_links_fails_before_network() {
    let config_home = TempDir::new().unwrap();
    rapidshare(&config_home)
        .args(["--anonymous", "-q", "download"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No file links given"));
}

#[test]
fn test_binary_rejects_invalid_config_file() {
    let config_home = TempDir::new().unwrap();
    let dir = config_home.path().join("rapidshare");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "colour = \"blue\"\n").unwrap();

    rapidshare(&config_home)
        .args(["--anonymous", "download"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn test_binary_login_without_any_password_fails_before_network() {
    let config_home = TempDir::new().unwrap();
    rapidshare(&config_home)
        .args(["--login", "me", "account"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a password"));
}
