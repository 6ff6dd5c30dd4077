//! Student command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, resolved_by_json};
use fallible_config::RecoveryConfig;
use fallible_outcome::{FailureKind, Outcome};
use fallible_recovery::{DispatchConfigError, Dispatcher};

/// Minimum nickname length, exclusive.
const MIN_NICKNAME_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, FailureKind)]
#[failure(domain = "student")]
pub enum StudentError {
    Invalid(String),
    TooShort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    name: String,
}

impl Student {
    /// Fails with `Invalid` when no name is given.
    pub fn new(name: Option<String>) -> Outcome<Self, StudentError> {
        match name {
            Some(name) => Outcome::success(Self { name }),
            None => Outcome::failure(StudentError::Invalid("Invalid".to_owned())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fails with `TooShort` unless `nickname` has more than five characters.
    pub fn my_name(&self, nickname: &str) -> Outcome<String, StudentError> {
        if nickname.chars().count() > MIN_NICKNAME_CHARS {
            Outcome::success(format!("My name is {nickname}"))
        } else {
            Outcome::failure(StudentError::TooShort)
        }
    }
}

pub fn student_dispatcher(
    recovery: &RecoveryConfig,
) -> Result<Dispatcher<StudentError, String>, DispatchConfigError> {
    Dispatcher::builder()
        .on_kind("TooShort", |_| "Name too short".to_owned())
        .fallback(|error: StudentError| format!("{error:?}"))
        .lint_policy(recovery.lint)
        .log_fallback(recovery.log_fallback)
        .build()
}

/// Run the student command.
pub fn run_student(
    mode: OutputMode,
    recovery: &RecoveryConfig,
    name: Option<String>,
    nickname: &str,
) -> Result<CliOutput, CliError> {
    let dispatcher = student_dispatcher(recovery)?;
    let mut lines = Vec::new();
    let outcome = Outcome::catching(|| {
        let student = Student::new(name).into_result()?;
        lines.push(format!("name: {}", student.name()));
        student.my_name(nickname).into_result()
    });
    let resolution = dispatcher.resolve_traced(outcome);
    lines.push(resolution.value.clone());

    let mut text = lines.join("\n");
    text.push('\n');
    let stdout = mode.render(
        text,
        "student",
        serde_json::json!({
            "status": "ok",
            "lines": lines,
            "resolvedBy": resolved_by_json(&resolution.resolved_by),
        }),
    )?;
    Ok(CliOutput::ok(stdout))
}
