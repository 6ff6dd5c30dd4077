//! The two-variant outcome container.

use crate::FailureKind;
use fallible_shared::FailureReport;

/// Either a success value or a typed failure.
///
/// An outcome is created where a fallible operation concludes and consumed
/// exactly once: propagated (via [`Outcome::into_result`] and `?`),
/// defaulted, dispatched, or force-unwrapped. It exposes no mutable access
/// and is deliberately not `Clone`.
#[must_use = "an outcome must be propagated, unwrapped, or dispatched"]
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<S, F> {
    /// The operation produced a value.
    Success(S),
    /// The operation failed with a registered failure kind.
    Failure(F),
}

impl<S, F: FailureKind> Outcome<S, F> {
    /// Wrap a success value.
    pub const fn success(value: S) -> Self {
        Self::Success(value)
    }

    /// Wrap a failure value.
    pub const fn failure(kind: F) -> Self {
        Self::Failure(kind)
    }

    /// Run a block that propagates failures with `?` and capture its result.
    pub fn catching<Op>(op: Op) -> Self
    where
        Op: FnOnce() -> Result<S, F>,
    {
        op().into()
    }

    /// Returns true for `Success`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for `Failure`.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns true when the failure models cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Success(_) => false,
            Self::Failure(failure) => failure.is_cancellation(),
        }
    }

    /// Borrow both variants.
    pub const fn as_ref(&self) -> Outcome<&S, &F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Transform the success value; a failure passes through untouched and
    /// `transform` is not called.
    pub fn map_success<S2, T>(self, transform: T) -> Outcome<S2, F>
    where
        T: FnOnce(S) -> S2,
    {
        match self {
            Self::Success(value) => Outcome::Success(transform(value)),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Transform the failure value; a success passes through untouched and
    /// `transform` is not called.
    pub fn map_failure<F2, T>(self, transform: T) -> Outcome<S, F2>
    where
        F2: FailureKind,
        T: FnOnce(F) -> F2,
    {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(failure) => Outcome::Failure(transform(failure)),
        }
    }

    /// Chain another fallible step onto a success.
    pub fn and_then<S2, Op>(self, op: Op) -> Outcome<S2, F>
    where
        Op: FnOnce(S) -> Outcome<S2, F>,
    {
        match self {
            Self::Success(value) => op(value),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Return the success value, or `default` on any failure.
    pub fn unwrap_or(self, default: S) -> S {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => default,
        }
    }

    /// Return the success value, or compute one from the failure.
    pub fn unwrap_or_else<Op>(self, op: Op) -> S
    where
        Op: FnOnce(F) -> S,
    {
        match self {
            Self::Success(value) => value,
            Self::Failure(failure) => op(failure),
        }
    }

    /// Return the success value or terminate.
    ///
    /// This opts out of structured handling entirely: a failure panics with a
    /// forced-unwrap report carrying the failure's domain, kind, and data.
    /// It is the only operation on `Outcome` that can terminate, and callers
    /// should reach for it only when a failure is impossible by construction.
    #[track_caller]
    pub fn unwrap_or_raise(self) -> S {
        match self {
            Self::Success(value) => value,
            Self::Failure(failure) => raise(&failure),
        }
    }

    /// Keep only presence: failure detail is discarded.
    pub fn as_optional(self) -> Option<S> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Return the failure, if any.
    pub fn into_failure(self) -> Option<F> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Convert into a standard `Result` so `?` can propagate the failure.
    pub fn into_result(self) -> Result<S, F> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }

    /// Structured report for a failure; `None` on success.
    #[must_use]
    pub fn failure_report(&self) -> Option<FailureReport> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure.report()),
        }
    }
}

#[cold]
#[track_caller]
#[expect(
    clippy::panic,
    reason = "forced unwrap is the documented termination escape hatch"
)]
fn raise<F: FailureKind>(failure: &F) -> ! {
    let report = FailureReport::forced(format!(
        "forced unwrap of a {} failure",
        F::domain()
    ))
    .with_secondary(failure.report());
    tracing::error!(
        domain = F::domain(),
        kind = failure.kind(),
        "forced unwrap hit a failure outcome"
    );
    panic!("{report}")
}

impl<S, F: FailureKind> From<Result<S, F>> for Outcome<S, F> {
    fn from(result: Result<S, F>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(failure) => Self::Failure(failure),
        }
    }
}

impl<S, F: FailureKind> From<Outcome<S, F>> for Result<S, F> {
    fn from(outcome: Outcome<S, F>) -> Self {
        outcome.into_result()
    }
}

/// Values that can conclude a fallible operation.
///
/// Implemented for [`Outcome`] and `Result`, so scopes and dispatchers accept
/// either shape while inferring the success and failure types.
pub trait IntoOutcome {
    /// Success type.
    type Success;
    /// Failure type.
    type Failure: FailureKind;

    /// Convert into an outcome.
    fn into_outcome(self) -> Outcome<Self::Success, Self::Failure>;
}

impl<S, F: FailureKind> IntoOutcome for Outcome<S, F> {
    type Success = S;
    type Failure = F;

    fn into_outcome(self) -> Self {
        self
    }
}

impl<S, F: FailureKind> IntoOutcome for Result<S, F> {
    type Success = S;
    type Failure = F;

    fn into_outcome(self) -> Outcome<S, F> {
        self.into()
    }
}
