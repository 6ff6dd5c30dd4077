//! Defer command handler: runs labeled cleanup actions in a scope.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use fallible_defer::{ExitCause, ScopeExit, scoped};
use fallible_outcome::FailureKind;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FailureKind)]
#[failure(domain = "defer")]
pub enum DeferDemoError {
    ExitedEarly,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cleanup `{0}` failed on request")]
struct RequestedFailure(String);

/// Inputs for the defer command.
#[derive(Debug, Clone, Default)]
pub struct DeferCommandInput {
    pub labels: Vec<String>,
    pub fail: Option<String>,
    pub exit_early: bool,
}

fn leave_early(exit_early: bool) -> Result<(), DeferDemoError> {
    if exit_early {
        Err(DeferDemoError::ExitedEarly)
    } else {
        Ok(())
    }
}

/// Register one action per label, run the body, and report what ran.
pub fn run_scope_demo(input: &DeferCommandInput, ran: &RefCell<Vec<String>>) -> ScopeExit<usize, DeferDemoError> {
    scoped(|scope| {
        for label in &input.labels {
            let fails = input.fail.as_deref() == Some(label.as_str());
            let name = label.clone();
            scope.defer_fallible(label.clone(), move || {
                ran.borrow_mut().push(name.clone());
                if fails {
                    Err(RequestedFailure(name))
                } else {
                    Ok(())
                }
            });
        }
        leave_early(input.exit_early)?;
        Ok::<_, DeferDemoError>(input.labels.len())
    })
}

/// Run the defer command.
pub fn run_defer(mode: OutputMode, input: &DeferCommandInput) -> Result<CliOutput, CliError> {
    if input.labels.is_empty() {
        return Err(CliError::InvalidInput("at least one --label is required".to_owned()));
    }
    if let Some(fail) = &input.fail {
        if !input.labels.contains(fail) {
            return Err(CliError::InvalidInput(format!(
                "--fail `{fail}` does not name a registered --label"
            )));
        }
    }

    let ran = RefCell::new(Vec::new());
    let exit = run_scope_demo(input, &ran);
    let order = ran.into_inner();
    let cause = exit.cause();
    let failures: Vec<String> = exit.cleanup_failures().iter().map(ToString::to_string).collect();

    let mut text = format!("ran: {}\n", order.join(", "));
    for failure in &failures {
        text.push_str(&format!("cleanup failure: {failure}\n"));
    }
    text.push_str(&format!("exit: {cause}\n"));

    let succeeded = cause == ExitCause::Completed && exit.is_clean();
    let status = if succeeded { "ok" } else { "error" };
    let report = exit.report();
    let stdout = mode.render(
        text,
        "defer",
        serde_json::json!({
            "status": status,
            "ran": order,
            "exit": cause.to_string(),
            "cleanupFailures": failures,
            "report": report,
        }),
    )?;

    let exit_code = if succeeded {
        ExitCode::Ok
    } else {
        ExitCode::Unrecovered
    };
    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;

    fn input(labels: &[&str]) -> DeferCommandInput {
        DeferCommandInput {
            labels: labels.iter().map(|label| (*label).to_owned()).collect(),
            ..DeferCommandInput::default()
        }
    }

    #[test]
    fn labels_run_in_reverse() {
        let ran = RefCell::new(Vec::new());
        let exit = run_scope_demo(&input(&["A", "B", "C"]), &ran);

        assert!(exit.is_clean());
        assert_eq!(exit.cause(), ExitCause::Completed);
        assert_eq!(ran.into_inner(), ["C", "B", "A"]);
    }

    #[test]
    fn early_exit_still_runs_every_action() {
        let mut request = input(&["open", "lock"]);
        request.exit_early = true;
        let ran = RefCell::new(Vec::new());
        let exit = run_scope_demo(&request, &ran);

        assert_eq!(exit.cause(), ExitCause::Failed);
        assert_eq!(ran.into_inner(), ["lock", "open"]);
    }

    #[test]
    fn failing_action_does_not_stop_the_rest() -> Result<(), CliError> {
        let mut request = input(&["A", "B", "C"]);
        request.fail = Some("B".to_owned());
        let output = run_defer(
            OutputMode {
                format: OutputFormat::Text,
            },
            &request,
        )?;

        assert_eq!(output.exit_code, ExitCode::Unrecovered);
        assert!(output.stdout.starts_with("ran: C, B, A\n"));
        assert!(output.stdout.contains("cleanup failure: deferred action `B`"));
        assert!(output.stdout.ends_with("exit: completed\n"));
        Ok(())
    }

    #[test]
    fn no_labels_is_invalid_input() {
        let error = run_defer(
            OutputMode {
                format: OutputFormat::Json,
            },
            &DeferCommandInput::default(),
        )
        .err();
        assert_eq!(error.map(|error| error.exit_code()), Some(ExitCode::InvalidInput));
    }

    #[test]
    fn failing_an_unregistered_label_is_invalid_input() {
        let mut request = input(&["A", "B"]);
        request.fail = Some("C".to_owned());
        let error = run_defer(
            OutputMode {
                format: OutputFormat::Text,
            },
            &request,
        )
        .err();

        assert_eq!(error.map(|error| error.exit_code()), Some(ExitCode::InvalidInput));
    }
}
