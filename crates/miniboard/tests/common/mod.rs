//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

/// Run the miniboard binary in the specified directory.
///
/// Colors are off and no acting user is inherited from the environment.
pub fn run_miniboard_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_miniboard"))
        .args(args)
        .current_dir(dir)
        .env("MINIBOARD_COLOR", "0")
        .env("MINIBOARD_ASCII", "1")
        .env_remove("MINIBOARD_USER")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute miniboard binary")
}

/// Run a command that must succeed and return its stdout.
pub fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_miniboard_in_dir(dir, args);
    assert!(
        output.status.success(),
        "`miniboard {}` failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Run a command with `--json` and parse its output.
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut args = args.to_vec();
    args.push("--json");
    let stdout = run_ok(dir, &args);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

/// Initialize a board with user `alice`, project `MB` and release `1` due in 2099.
pub fn setup_board(dir: &Path) {
    run_ok(dir, &["init", "--user", "alice", "--quiet"]);
    run_ok(dir, &["project", "create", "MB", "--name", "Mini Board"]);
    run_ok(dir, &["release", "create", "1.0", "--due", "2099-01-01"]);
}

/// Create an issue in release `release` and return its id.
pub fn create_issue(dir: &Path, release: &str, title: &str) -> u64 {
    let issue = run_json(
        dir,
        &["create", "-p", "MB", "-r", release, "--title", title],
    );
    issue["id"].as_u64().expect("Issue should have a numeric id")
}
