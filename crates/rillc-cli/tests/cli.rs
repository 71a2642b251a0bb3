//! End-to-end tests driving the `rill` binary as a subprocess.
//!
//! These exercise the `run` subcommand against real script files on disk,
//! the way a user invokes the binary, rather than calling crate internals.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rill_bin() -> Command {
    Command::cargo_bin("rill").unwrap()
}

fn write_script(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).unwrap();
    path
}

#[test]
fn help_mentions_run_and_repl() {
    rill_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("repl")));
}

#[test]
fn version_flag_succeeds() {
    rill_bin().arg("--version").assert().success();
}

#[test]
fn run_executes_a_script_and_prints_its_output() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "hello.rill", r#"println("hello from a script");"#);

    rill_bin()
        .arg("run")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from a script"));
}

#[test]
fn run_reports_parse_errors_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "broken.rill", "let = ;");

    rill_bin()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn run_reports_a_missing_file() {
    rill_bin()
        .arg("run")
        .arg("/nonexistent/path/to/script.rill")
        .assert()
        .failure();
}

#[test]
fn run_honors_verbose_flag_without_crashing() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, "quiet.rill", "let x = 1;");

    rill_bin().arg("--verbose").arg("run").arg(&path).assert().success();
}
