//! # fallible-defer
//!
//! Cleanup actions bound to a lexical scope.
//!
//! Actions registered on a [`Scope`] run exactly once, in reverse
//! registration order, when the scope exits: by normal completion, by an
//! early `return` or `?`, or while a panic unwinds through it. A failing or
//! panicking action is recorded as a [`CleanupFailure`] and never prevents
//! the remaining actions from running.
//!
//! ```
//! use fallible_defer::{ExitCause, scoped};
//! use fallible_outcome::FailureKind;
//! use std::cell::Cell;
//!
//! #[derive(Debug, FailureKind)]
//! enum FileError {
//!     Disaster,
//! }
//!
//! let closed = Cell::new(false);
//! let exit = scoped(|scope| {
//!     scope.defer_labeled("close", || closed.set(true));
//!     Err::<(), _>(FileError::Disaster)?;
//!     Ok::<_, FileError>(())
//! });
//!
//! assert!(closed.get());
//! assert_eq!(exit.cause(), ExitCause::Failed);
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod action;
pub mod exit;
pub mod scope;

pub use action::{CleanupCause, CleanupFailure, DeferredAction};
pub use exit::{ExitCause, ScopeError, ScopeExit};
pub use scope::{Scope, ScopeId, ScopeState, scoped};
