//! Printer command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, resolved_by_json};
use fallible_config::RecoveryConfig;
use fallible_outcome::{FailureKind, Outcome};
use fallible_recovery::{DispatchConfigError, Dispatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, FailureKind)]
#[failure(domain = "printer")]
pub enum PrinterError {
    OutOfPaper,
    NoToner,
    OnFire,
}

/// Send `job` to the named printer.
pub fn send(job: u32, printer: &str) -> Outcome<String, PrinterError> {
    tracing::debug!(job, printer, "sending print job");
    match printer {
        "Never Has Toner" => Outcome::failure(PrinterError::NoToner),
        "Fire Hazard" => Outcome::failure(PrinterError::OnFire),
        "Empty Tray" => Outcome::failure(PrinterError::OutOfPaper),
        _ => Outcome::success("Job sent".to_owned()),
    }
}

pub fn printer_dispatcher(
    recovery: &RecoveryConfig,
) -> Result<Dispatcher<PrinterError, String>, DispatchConfigError> {
    Dispatcher::builder()
        .on_kind("OnFire", |_| {
            "I'll just put this over here, with the rest of the fire.".to_owned()
        })
        .on_kind("NoToner", |_| "The error is noToner".to_owned())
        .fallback(|error: PrinterError| format!("Printer error: {}.", error.kind()))
        .lint_policy(recovery.lint)
        .log_fallback(recovery.log_fallback)
        .build()
}

/// Run the printer command.
pub fn run_printer(
    mode: OutputMode,
    recovery: &RecoveryConfig,
    job: u32,
    printer: &str,
) -> Result<CliOutput, CliError> {
    let dispatcher = printer_dispatcher(recovery)?;
    let resolution = dispatcher.resolve_traced(send(job, printer));

    let stdout = mode.render(
        format!("{}\n", resolution.value),
        "printer",
        serde_json::json!({
            "status": "ok",
            "job": job,
            "printer": printer,
            "message": resolution.value,
            "resolvedBy": resolved_by_json(&resolution.resolved_by),
        }),
    )?;
    Ok(CliOutput::ok(stdout))
}
