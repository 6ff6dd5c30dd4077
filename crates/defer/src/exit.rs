//! What a scope hands back once its deferred actions have run.

use crate::action::CleanupFailure;
use crate::scope::ScopeId;
use fallible_outcome::{FailureKind, Outcome};
use fallible_shared::FailureReport;
use std::fmt;

/// How the scope body concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCause {
    /// The body produced a success value.
    Completed,
    /// The body produced a failure.
    Failed,
    /// The body produced a failure that models cancellation.
    Cancelled,
}

impl fmt::Display for ExitCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// The body's outcome plus every cleanup failure raised on exit.
///
/// Cleanup failures are kept apart from the outcome, so the exit cause is
/// never replaced by a failure that happened while cleaning up.
#[must_use = "a scope exit carries the body's outcome"]
#[derive(Debug)]
pub struct ScopeExit<S, F> {
    scope: ScopeId,
    outcome: Outcome<S, F>,
    cleanup: Vec<CleanupFailure>,
}

impl<S, F: FailureKind> ScopeExit<S, F> {
    pub(crate) const fn new(scope: ScopeId, outcome: Outcome<S, F>, cleanup: Vec<CleanupFailure>) -> Self {
        Self {
            scope,
            outcome,
            cleanup,
        }
    }

    /// Scope that produced this exit.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Exit cause derived from the body's outcome.
    #[must_use]
    pub fn cause(&self) -> ExitCause {
        match &self.outcome {
            Outcome::Success(_) => ExitCause::Completed,
            Outcome::Failure(failure) if failure.is_cancellation() => ExitCause::Cancelled,
            Outcome::Failure(_) => ExitCause::Failed,
        }
    }

    /// Borrow the body's outcome.
    pub const fn outcome(&self) -> Outcome<&S, &F> {
        self.outcome.as_ref()
    }

    /// Failures raised by deferred actions, in execution order.
    #[must_use]
    pub fn cleanup_failures(&self) -> &[CleanupFailure] {
        &self.cleanup
    }

    /// Returns true when every deferred action ran without failing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.cleanup.is_empty()
    }

    /// Split into the outcome and the cleanup failures.
    pub fn into_parts(self) -> (Outcome<S, F>, Vec<CleanupFailure>) {
        (self.outcome, self.cleanup)
    }

    /// Keep the outcome; cleanup failures are logged and dropped.
    pub fn into_outcome(self) -> Outcome<S, F> {
        for failure in &self.cleanup {
            tracing::warn!(
                scope = %self.scope,
                label = %failure.label,
                error = %failure.cause,
                "discarding cleanup failure"
            );
        }
        self.outcome
    }

    /// Success only when the body succeeded and every action ran cleanly.
    pub fn into_result(self) -> Result<S, ScopeError<S, F>> {
        match self.outcome {
            Outcome::Failure(failure) => Err(ScopeError::Failed {
                failure,
                cleanup: self.cleanup,
            }),
            Outcome::Success(value) if self.cleanup.is_empty() => Ok(value),
            Outcome::Success(value) => Err(ScopeError::CleanupFailed {
                value,
                cleanup: self.cleanup,
            }),
        }
    }

    /// Structured report, or `None` for a clean success.
    ///
    /// A body failure is the primary report with each cleanup failure
    /// attached as secondary; a successful body with failing cleanup
    /// reports the first cleanup failure with the rest attached.
    #[must_use]
    pub fn report(&self) -> Option<FailureReport> {
        compose_report(self.outcome.failure_report(), &self.cleanup)
    }
}

fn compose_report(primary: Option<FailureReport>, cleanup: &[CleanupFailure]) -> Option<FailureReport> {
    let mut secondary = cleanup.iter().map(CleanupFailure::report);
    let primary = match primary {
        Some(report) => report,
        None => secondary.next()?,
    };
    Some(primary.with_secondaries(secondary))
}

/// A scope exit that was not a clean success.
#[derive(Debug)]
pub enum ScopeError<S, F> {
    /// The body failed; cleanup failures, if any, are secondary.
    Failed {
        /// Body failure.
        failure: F,
        /// Cleanup failures raised on exit.
        cleanup: Vec<CleanupFailure>,
    },
    /// The body succeeded but at least one deferred action failed.
    CleanupFailed {
        /// Value the body produced.
        value: S,
        /// Cleanup failures raised on exit.
        cleanup: Vec<CleanupFailure>,
    },
}

impl<S, F: FailureKind> ScopeError<S, F> {
    /// Body failure, when the body failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&F> {
        match self {
            Self::Failed { failure, .. } => Some(failure),
            Self::CleanupFailed { .. } => None,
        }
    }

    /// Cleanup failures raised on exit.
    #[must_use]
    pub fn cleanup(&self) -> &[CleanupFailure] {
        match self {
            Self::Failed { cleanup, .. } | Self::CleanupFailed { cleanup, .. } => cleanup,
        }
    }

    /// Structured report with cleanup failures as secondary entries.
    #[must_use]
    pub fn report(&self) -> FailureReport {
        let primary = self.failure().map(FailureKind::report);
        compose_report(primary, self.cleanup()).unwrap_or_else(|| {
            FailureReport::cleanup(
                fallible_shared::ErrorCode::cleanup_failed(),
                "scope exited with cleanup failures",
            )
        })
    }
}

impl<S, F: FailureKind> fmt::Display for ScopeError<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { failure, cleanup } => {
                write!(f, "scope failed with {}:{}", F::domain(), failure.kind())?;
                if !cleanup.is_empty() {
                    write!(f, " ({} cleanup failures)", cleanup.len())?;
                }
                Ok(())
            },
            Self::CleanupFailed { cleanup, .. } => {
                write!(f, "scope completed but {} cleanup actions failed", cleanup.len())
            },
        }
    }
}

impl<S: fmt::Debug, F: FailureKind> std::error::Error for ScopeError<S, F> {}
