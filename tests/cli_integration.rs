//! CLI integration tests
//!
//! These drive the compiled binary. None of them reach a completion service:
//! they either stop before the first request or never build a client.

mod support;

use serial_test::serial;
use std::path::Path;
use std::process::{Command, Output};
use support::{files_in, write_log};
use tempfile::TempDir;

fn loglens(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loglens"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env_remove("LOGLENS_BATCH_SIZE")
        .env_remove("LOGLENS_PROVIDER")
        .env_remove("LOGLENS_MODEL")
        .output()
        .expect("Failed to run loglens")
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let output = loglens(&["--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("batches"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    let output = loglens(&["--version"], dir.path());

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
#[serial]
fn test_batches_prints_plan() {
    let dir = TempDir::new().unwrap();
    write_log(
        dir.path(),
        "auth.log",
        "sshd: Failed password for root\n\n  sudo: session opened  \ncron: job started\n",
    );

    let output = loglens(&["batches", "auth.log", "--batch-size", "2"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lines: 4  Entries: 3  Batches: 2"));
    assert!(stdout.contains("sudo: session opened"));
    assert_eq!(files_in(dir.path()).len(), 1);
}

#[test]
#[serial]
fn test_analyze_missing_file_is_noop() {
    let dir = TempDir::new().unwrap();

    let output = loglens(
        &["analyze", "missing.log", "--delay-ms", "0", "-o", "out"],
        dir.path(),
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!dir.path().join("out").exists());
}

#[test]
#[serial]
fn test_analyze_rejects_zero_batch_size() {
    let dir = TempDir::new().unwrap();
    write_log(dir.path(), "auth.log", "entry\n");

    let output = loglens(&["analyze", "auth.log", "--batch-size", "0"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(files_in(dir.path()).len(), 1);
}

#[test]
fn test_analyze_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let output = loglens(&["analyze", "auth.log", "--format", "yaml"], dir.path());

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("yaml"));
}
