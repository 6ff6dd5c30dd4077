//! # fallible-recovery
//!
//! Structured recovery for [`fallible_outcome::Outcome`] failures.
//!
//! A [`Dispatcher`] holds ordered [`RecoveryPattern`]s and a mandatory
//! fallback. Successes bypass every pattern; failures go to the first
//! matching pattern, or to the fallback when nothing matches. Wiring
//! mistakes (no fallback, unknown kind names, dead patterns under
//! [`LintPolicy::Deny`]) surface as [`DispatchConfigError`] from
//! [`DispatcherBuilder::build`], never at dispatch time.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod dispatcher;
pub mod lint;
pub mod pattern;

pub use dispatcher::{
    DispatchConfigError, Dispatcher, DispatcherBuilder, Resolution, ResolvedBy, attempt,
};
pub use lint::{LintPolicy, ParseLintPolicyError, PatternLint};
pub use pattern::{Coverage, RecoveryPattern};
