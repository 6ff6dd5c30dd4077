//! Divide command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, resolved_by_json};
use fallible_config::RecoveryConfig;
use fallible_outcome::{FailureKind, Outcome};
use fallible_recovery::{DispatchConfigError, Dispatcher, RecoveryPattern};
use std::fmt;

/// Ways integer division can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FailureKind)]
#[failure(domain = "division")]
pub enum DivisionError {
    DividedByZero,
    Overflow,
}

impl fmt::Display for DivisionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DividedByZero => formatter.write_str("Denominator cannot be 0"),
            Self::Overflow => formatter.write_str("Quotient does not fit in 64 bits"),
        }
    }
}

pub fn division(numerator: i64, denominator: i64) -> Outcome<i64, DivisionError> {
    if denominator == 0 {
        return Outcome::failure(DivisionError::DividedByZero);
    }
    match numerator.checked_div(denominator) {
        Some(quotient) => Outcome::success(quotient),
        None => Outcome::failure(DivisionError::Overflow),
    }
}

pub fn division_dispatcher(
    recovery: &RecoveryConfig,
) -> Result<Dispatcher<DivisionError, String>, DispatchConfigError> {
    Dispatcher::builder()
        .pattern(
            RecoveryPattern::on_kind("DividedByZero", |error: DivisionError| {
                format!("Error: {error}")
            })
            .labeled("divided-by-zero"),
        )
        .fallback(|error: DivisionError| format!("Error: {error}"))
        .lint_policy(recovery.lint)
        .log_fallback(recovery.log_fallback)
        .build()
}

/// Run the divide command.
pub fn run_divide(
    mode: OutputMode,
    recovery: &RecoveryConfig,
    numerator: i64,
    denominator: i64,
    force: bool,
) -> Result<CliOutput, CliError> {
    if force {
        let quotient = division(numerator, denominator).unwrap_or_raise();
        let stdout = mode.render(
            format!("{quotient}\n"),
            "divide",
            serde_json::json!({
                "status": "ok",
                "result": quotient.to_string(),
                "resolvedBy": { "branch": "success" },
            }),
        )?;
        return Ok(CliOutput::ok(stdout));
    }

    let dispatcher = division_dispatcher(recovery)?;
    let resolution = dispatcher
        .resolve_traced(division(numerator, denominator).map_success(|quotient| quotient.to_string()));

    let stdout = mode.render(
        format!("{}\n", resolution.value),
        "divide",
        serde_json::json!({
            "status": "ok",
            "result": resolution.value,
            "resolvedBy": resolved_by_json(&resolution.resolved_by),
        }),
    )?;
    Ok(CliOutput::ok(stdout))
}
