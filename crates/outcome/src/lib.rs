//! # fallible-outcome
//!
//! Typed success/failure container over closed failure families.
//!
//! - [`Outcome`] holds either a success value or a failure value
//! - [`FailureKind`] registers the fixed set of failure kinds of a domain
//! - [`IntoOutcome`] lets scopes and dispatchers accept `Outcome` or `Result`
//!
//! ```
//! use fallible_outcome::{FailureKind, Outcome};
//!
//! #[derive(Debug, FailureKind)]
//! #[failure(domain = "division")]
//! enum DivisionError {
//!     DividedByZero,
//! }
//!
//! fn division(numerator: i32, denominator: i32) -> Outcome<i32, DivisionError> {
//!     if denominator == 0 {
//!         return Outcome::failure(DivisionError::DividedByZero);
//!     }
//!     Outcome::success(numerator / denominator)
//! }
//!
//! assert_eq!(division(10, 5).unwrap_or(-1), 2);
//! assert_eq!(division(10, 0).as_optional(), None);
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

extern crate self as fallible_outcome;

pub mod kind;
pub mod outcome;

pub use fallible_derive::FailureKind;
pub use kind::{FailureKind, is_registered_kind};
pub use outcome::{IntoOutcome, Outcome};
