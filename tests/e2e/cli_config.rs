//! Config loading E2E tests through the CLI binary.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn run_cli(args: &[&str], env: &[(&str, &str)]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_fallible"));
    command.args(args);
    for (key, _) in std::env::vars() {
        if key.starts_with("FALLIBLE_") {
            command.env_remove(key);
        }
    }
    command.env_remove("RUST_LOG");
    command.envs(env.iter().copied());
    command.output()
}

fn write_fixture(name: &str, contents: &str) -> io::Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("fallible-cli-e2e-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn show_without_file_prints_defaults() -> io::Result<()> {
    let output = run_cli(&["config", "show"], &[])?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("[logging]"));
    assert!(stdout.contains("level = \"warn\""));
    assert!(stdout.contains("lint = \"warn\""));
    Ok(())
}

#[test]
fn env_overrides_win_over_the_file() -> io::Result<()> {
    let path = write_fixture("override.json", r#"{"recovery":{"lint":"deny"}}"#)?;
    let output = run_cli(
        &["--output", "json", "config", "show", "--path", &path_arg(&path)],
        &[("FALLIBLE_LINT", "allow")],
    )?;
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(io::Error::other)?;

    assert!(output.status.success());
    assert_eq!(value["config"]["recovery"]["lint"], "allow");
    Ok(())
}

#[test]
fn check_accepts_toml_files() -> io::Result<()> {
    let path = write_fixture("valid.toml", "[logging]\nlevel = \"error\"\n")?;
    let output = run_cli(&["config", "check", "--path", &path_arg(&path)], &[])?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.starts_with("status: ok\n"));
    assert!(stdout.contains("log level: error"));
    Ok(())
}

#[test]
fn check_fails_on_invalid_json() -> io::Result<()> {
    let path = write_fixture("invalid.json", r#"{"recovery":{"lint":"sometimes"}}"#)?;
    let output = run_cli(
        &["--output", "json", "config", "check", "--path", &path_arg(&path)],
        &[],
    )?;
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(io::Error::other)?;

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"]["code"], "invalid_json");
    Ok(())
}

#[test]
fn missing_file_is_an_io_failure() -> io::Result<()> {
    let output = run_cli(&["config", "check", "--path", "no/such/fallible.toml"], &[])?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr.starts_with("error: failed to read config file"));
    Ok(())
}

#[test]
fn malformed_env_is_invalid_input() -> io::Result<()> {
    let output = run_cli(&["config", "show"], &[("FALLIBLE_LOG_FALLBACK", "maybe")])?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("FALLIBLE_LOG_FALLBACK"));
    Ok(())
}
