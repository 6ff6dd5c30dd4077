//! Deferred cleanup E2E tests through the CLI binary.

use std::io;
use std::process::{Command, Output};

fn run_defer(args: &[&str]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_fallible"));
    command.arg("defer").args(args);
    for (key, _) in std::env::vars() {
        if key.starts_with("FALLIBLE_") {
            command.env_remove(key);
        }
    }
    command.env_remove("RUST_LOG");
    command.output()
}

#[test]
fn actions_run_in_reverse_registration_order() -> io::Result<()> {
    let output = run_defer(&["--label", "A", "--label", "B", "--label", "C"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout, "ran: C, B, A\nexit: completed\n");
    Ok(())
}

#[test]
fn early_exit_runs_every_action_and_reports_failure() -> io::Result<()> {
    let output = run_defer(&["--label", "open", "--label", "lock", "--exit-early"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(stdout, "ran: lock, open\nexit: failed\n");
    Ok(())
}

#[test]
fn cleanup_failure_is_secondary_to_the_exit_cause() -> io::Result<()> {
    let output = run_defer(&[
        "--output",
        "json",
        "--label",
        "A",
        "--label",
        "B",
        "--fail",
        "B",
        "--exit-early",
    ])?;
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(io::Error::other)?;

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(value.get("exit").and_then(|value| value.as_str()), Some("failed"));
    assert_eq!(value["ran"], serde_json::json!(["B", "A"]));

    let report = value.get("report").ok_or_else(|| io::Error::other("missing report"))?;
    assert_eq!(report.get("category").and_then(|value| value.as_str()), Some("domain"));
    let secondary = report
        .get("secondary")
        .and_then(|value| value.as_array())
        .ok_or_else(|| io::Error::other("missing secondary reports"))?;
    assert_eq!(secondary.len(), 1);
    assert_eq!(
        secondary
            .first()
            .and_then(|value| value.get("category"))
            .and_then(|value| value.as_str()),
        Some("cleanup")
    );
    Ok(())
}

#[test]
fn failing_an_unknown_label_is_rejected() -> io::Result<()> {
    let output = run_defer(&["--label", "A", "--fail", "Z"])?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("--fail `Z`"), "stderr: {stderr}");
    Ok(())
}
