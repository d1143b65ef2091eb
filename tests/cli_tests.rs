//! Integration tests for the CLI interface
//!
//! The log executable is replaced by small shell scripts so the tests run
//! without a real repository.

use assert_cmd::Command;
use graphlog::graph::MARKER;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn revision(glyph: &str, change: &str, commit: &str, description: &str) -> String {
    format!(
        r"\033[32m{glyph}\033[0m  {MARKER}{change}{MARKER}{commit}{MARKER}false\033[1m{change}\033[0m {description}\n"
    )
}

/// Raw log output as the executable would print it
fn raw_log() -> String {
    format!(
        "\x1b[32m@\x1b[0m  {MARKER}a{MARKER}1{MARKER}false\x1b[1ma\x1b[0m first\n\
         │  more\n\
         \x1b[32m○\x1b[0m  {MARKER}b{MARKER}2{MARKER}false\x1b[1mb\x1b[0m second\n\
         ~\n"
    )
}

/// Write an executable script standing in for `jj`. It records its
/// arguments to `args.txt` next to itself before running `body`.
#[cfg(unix)]
fn fake_executable(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-jj");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{}\n",
        dir.join("args.txt").display(),
        body
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn recorded_args(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// A `graphlog` command isolated from the user's configuration
fn graphlog(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("graphlog").unwrap();
    cmd.current_dir(dir.path())
        .env("GRAPHLOG_CONFIG_DIR", dir.path().join("config"))
        .env_remove("GRAPHLOG_EXECUTABLE")
        .env_remove("GRAPHLOG_REVSET")
        .env_remove("GRAPHLOG_BATCH_SIZE")
        .env_remove("GRAPHLOG_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help_flag() {
    let dir = TempDir::new().unwrap();
    graphlog(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--batch-size"))
        .stdout(predicate::str::contains("--stdin"));
}

#[test]
fn test_ids_and_json_conflict() {
    let dir = TempDir::new().unwrap();
    graphlog(&dir)
        .args(["--stdin", "--ids", "--json"])
        .assert()
        .failure();
}

#[test]
fn test_stdin_plain_output() {
    let dir = TempDir::new().unwrap();
    graphlog(&dir)
        .arg("--stdin")
        .write_stdin(raw_log())
        .assert()
        .success()
        .stdout("@  a first\n│  more\n○  b second\n~\n");
}

#[test]
fn test_stdin_ids_output() {
    let dir = TempDir::new().unwrap();
    graphlog(&dir)
        .args(["--stdin", "--ids"])
        .write_stdin(raw_log())
        .assert()
        .success()
        .stdout("a 1\nb 2\n");
}

#[test]
fn test_stdin_json_output() {
    let dir = TempDir::new().unwrap();
    let output = graphlog(&dir)
        .args(["--stdin", "--json"])
        .write_stdin(raw_log())
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["change_id"], "b");
    assert_eq!(rows[1]["previous"], 0);
    assert_eq!(rows[1]["lines"][1]["gutter"], "~");
}

#[test]
fn test_stdin_without_revisions_prints_nothing() {
    let dir = TempDir::new().unwrap();
    graphlog(&dir)
        .arg("--stdin")
        .write_stdin("no graph here\n")
        .assert()
        .success()
        .stdout("");
}

#[cfg(unix)]
#[test]
fn test_streams_from_executable_in_small_batches() {
    let dir = TempDir::new().unwrap();
    let body: String = (0..7)
        .map(|i| format!("printf '{}'", revision("○", &format!("c{i}"), &format!("{i}"), "msg")))
        .collect::<Vec<_>>()
        .join("\n");
    let exe = fake_executable(dir.path(), &body);

    let expected: String = (0..7).map(|i| format!("c{i} {i}\n")).collect();
    graphlog(&dir)
        .env("GRAPHLOG_EXECUTABLE", &exe)
        .args(["--ids", "--batch-size", "3", "-r", "::@"])
        .assert()
        .success()
        .stdout(expected);

    let args = recorded_args(dir.path());
    assert_eq!(&args[..5], ["log", "--color", "always", "--quiet", "--no-pager"]);
    let r = args.iter().position(|a| a == "-r").unwrap();
    assert_eq!(args[r + 1], "::@");
    assert!(args.iter().any(|a| a == "-T"));
}

#[cfg(unix)]
#[test]
fn test_failure_reports_stderr() {
    let dir = TempDir::new().unwrap();
    let exe = fake_executable(dir.path(), "echo 'Error: Revision `nope` does not exist' >&2\nexit 1");

    graphlog(&dir)
        .env("GRAPHLOG_EXECUTABLE", &exe)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Revision `nope` does not exist"));
}

#[cfg(unix)]
#[test]
fn test_warning_does_not_stop_output() {
    let dir = TempDir::new().unwrap();
    let body = format!(
        "echo 'Warning: working copy is stale' >&2\nsleep 0.2\nprintf '{}'",
        revision("@", "a", "1", "only")
    );
    let exe = fake_executable(dir.path(), &body);

    graphlog(&dir)
        .env("GRAPHLOG_EXECUTABLE", &exe)
        .assert()
        .success()
        .stdout("@  a only\n")
        .stderr(predicate::str::contains("warning: Warning: working copy is stale"));
}

#[test]
fn test_missing_executable_exits_with_two() {
    let dir = TempDir::new().unwrap();
    graphlog(&dir)
        .env("GRAPHLOG_EXECUTABLE", dir.path().join("does-not-exist"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Command not found"));
}

#[cfg(unix)]
#[test]
fn test_project_config_and_cli_precedence() {
    let dir = TempDir::new().unwrap();
    let exe = fake_executable(dir.path(), &format!("printf '{}'", revision("@", "a", "1", "x")));
    std::fs::write(
        dir.path().join(".graphlog.toml"),
        format!("executable = \"{}\"\nrevset = \"trunk()\"\n", exe.display()),
    )
    .unwrap();

    graphlog(&dir).assert().success();
    let args = recorded_args(dir.path());
    assert!(args.iter().any(|a| a == "trunk()"));

    graphlog(&dir).args(["-r", "@"]).assert().success();
    let args = recorded_args(dir.path());
    assert!(!args.iter().any(|a| a == "trunk()"));
    assert!(args.iter().any(|a| a == "@"));
}

#[cfg(unix)]
#[test]
fn test_global_config_directory() {
    let dir = TempDir::new().unwrap();
    let exe = fake_executable(dir.path(), &format!("printf '{}'", revision("@", "g", "9", "x")));
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!("executable = \"{}\"\n", exe.display()),
    )
    .unwrap();

    graphlog(&dir)
        .arg("--ids")
        .assert()
        .success()
        .stdout("g 9\n");
}

#[test]
fn test_invalid_project_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".graphlog.toml"), "batch_size = \"many\"\n").unwrap();

    graphlog(&dir)
        .arg("--stdin")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".graphlog.toml"));
}
