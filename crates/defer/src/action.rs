//! Deferred actions and the failures they can raise.

use crate::ScopeId;
use fallible_shared::{ErrorCode, FailureReport};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

type ActionFn<'env> = Box<dyn FnOnce() -> Result<(), String> + 'env>;

/// An owned, zero-argument cleanup step registered against a scope.
///
/// Actions are consumed when invoked, so each runs at most once.
pub struct DeferredAction<'env> {
    scope: ScopeId,
    sequence: usize,
    label: Cow<'static, str>,
    run: ActionFn<'env>,
}

impl<'env> DeferredAction<'env> {
    pub(crate) fn new(
        scope: ScopeId,
        sequence: usize,
        label: Option<Cow<'static, str>>,
        run: ActionFn<'env>,
    ) -> Self {
        let label = label.unwrap_or_else(|| Cow::Owned(format!("deferred#{sequence}")));
        Self {
            scope,
            sequence,
            label,
            run,
        }
    }

    /// Scope that registered the action.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Registration index within the scope (0-based).
    #[must_use]
    pub const fn sequence(&self) -> usize {
        self.sequence
    }

    /// Diagnostic label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the action, converting an error return or a panic into a
    /// [`CleanupFailure`].
    pub(crate) fn invoke(self) -> Result<(), CleanupFailure> {
        let Self {
            scope,
            sequence,
            label,
            run,
        } = self;

        let cause = match panic::catch_unwind(AssertUnwindSafe(run)) {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(message)) => CleanupCause::Error(message),
            Err(payload) => CleanupCause::Panicked(panic_message(payload.as_ref())),
        };

        Err(CleanupFailure {
            scope,
            sequence,
            label: label.into_owned(),
            cause,
        })
    }
}

impl fmt::Debug for DeferredAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredAction")
            .field("scope", &self.scope)
            .field("sequence", &self.sequence)
            .field("label", &self.label)
            .field("run", &"<closure>")
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&'static str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

/// Why a deferred action failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CleanupCause {
    /// The action returned an error.
    #[error("returned error: {0}")]
    Error(String),
    /// The action panicked.
    #[error("panicked: {0}")]
    Panicked(String),
}

/// A deferred action that failed while its scope was exiting.
///
/// Cleanup failures are secondary: they are attached to the scope's exit
/// cause and never replace it, and they never stop the remaining actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("deferred action `{label}` (#{sequence}) in {scope} {cause}")]
pub struct CleanupFailure {
    /// Scope whose exit ran the action.
    pub scope: ScopeId,
    /// Registration index within the scope.
    pub sequence: usize,
    /// Action label.
    pub label: String,
    /// Failure cause.
    pub cause: CleanupCause,
}

impl CleanupFailure {
    /// Returns true if the action panicked rather than returning an error.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self.cause, CleanupCause::Panicked(_))
    }

    /// Structured rendering in the cleanup category.
    #[must_use]
    pub fn report(&self) -> FailureReport {
        let code = match self.cause {
            CleanupCause::Error(_) => ErrorCode::cleanup_failed(),
            CleanupCause::Panicked(_) => ErrorCode::cleanup_panicked(),
        };
        FailureReport::cleanup(code, self.cause.to_string())
            .with_metadata("scope", self.scope.to_string())
            .with_metadata("sequence", self.sequence.to_string())
            .with_metadata("label", self.label.clone())
    }
}
