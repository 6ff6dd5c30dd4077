//! Recovery dispatch E2E tests through the CLI binary.

use std::io;
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

fn stdout_of(output: &Output) -> io::Result<String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(io::Error::other(format!("command failed: {stderr}")));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[test]
fn divide_by_zero_is_recovered() -> io::Result<()> {
    let output = run_cli(&["divide", "--numerator", "10", "--denominator", "0"], &[])?;
    assert_eq!(stdout_of(&output)?, "Error: Denominator cannot be 0\n");
    Ok(())
}

#[test]
fn successful_division_prints_the_quotient() -> io::Result<()> {
    let output = run_cli(&["divide", "--numerator", "10", "--denominator", "5"], &[])?;
    assert_eq!(stdout_of(&output)?, "2\n");
    Ok(())
}

#[test]
fn overflow_is_caught_by_the_fallback() -> io::Result<()> {
    let output = run_cli(
        &[
            "--output",
            "json",
            "divide",
            "--numerator",
            "-9223372036854775808",
            "--denominator",
            "-1",
        ],
        &[],
    )?;
    let value: serde_json::Value =
        serde_json::from_str(stdout_of(&output)?.trim()).map_err(io::Error::other)?;

    assert_eq!(
        value.get("result").and_then(|value| value.as_str()),
        Some("Error: Quotient does not fit in 64 bits")
    );
    assert_eq!(
        value
            .get("resolvedBy")
            .and_then(|value| value.get("branch"))
            .and_then(|value| value.as_str()),
        Some("fallback")
    );
    Ok(())
}

#[test]
fn forced_unwrap_terminates_the_process() -> io::Result<()> {
    let output = run_cli(
        &["divide", "--numerator", "10", "--denominator", "0", "--force"],
        &[],
    )?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("forced unwrap of a division failure"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn student_flow_prints_each_step() -> io::Result<()> {
    let output = run_cli(&["student", "--name", "Sunil", "--nickname", "Sunil"], &[])?;
    assert_eq!(stdout_of(&output)?, "name: Sunil\nName too short\n");

    let output = run_cli(&["student", "--name", "Sunil", "--nickname", "SunilK"], &[])?;
    assert_eq!(stdout_of(&output)?, "name: Sunil\nMy name is SunilK\n");
    Ok(())
}

#[test]
fn missing_student_name_reaches_the_fallback() -> io::Result<()> {
    let output = run_cli(&["student", "--nickname", "Daniel"], &[])?;
    assert_eq!(stdout_of(&output)?, "Invalid(\"Invalid\")\n");
    Ok(())
}

#[test]
fn printer_failures_take_their_patterns() -> io::Result<()> {
    let cases = [
        ("Gutenberg", "Job sent\n"),
        ("Never Has Toner", "The error is noToner\n"),
        ("Fire Hazard", "I'll just put this over here, with the rest of the fire.\n"),
        ("Empty Tray", "Printer error: OutOfPaper.\n"),
    ];
    for (printer, expected) in cases {
        let output = run_cli(&["printer", "--job", "1440", "--printer", printer], &[])?;
        assert_eq!(stdout_of(&output)?, expected, "printer {printer}");
    }
    Ok(())
}

#[test]
fn deny_lint_policy_accepts_exhaustive_dispatchers() -> io::Result<()> {
    let output = run_cli(
        &["printer", "--printer", "Fire Hazard"],
        &[("FALLIBLE_LINT", "deny")],
    )?;
    assert_eq!(
        stdout_of(&output)?,
        "I'll just put this over here, with the rest of the fire.\n"
    );
    Ok(())
}

#[test]
fn fallback_logging_is_opt_in() -> io::Result<()> {
    let output = run_cli(
        &["printer", "--printer", "Empty Tray"],
        &[("FALLIBLE_LOG_FALLBACK", "true")],
    )?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(stderr.contains("WARN"), "stderr: {stderr}");
    Ok(())
}
