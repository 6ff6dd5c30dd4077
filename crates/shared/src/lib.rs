//! # fallible-shared
//!
//! Shared failure taxonomy and structured reports for the fallible workspace.
//!
//! This crate provides foundational types that are used across all other crates:
//!
//! - [`ErrorCategory`] and [`ErrorCode`] describing where a failure comes from
//! - [`FailureReport`], the serializable rendering of any failure
//! - [`CancellationToken`] for cooperative cancellation
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Serde-compatible** - Reports serialize to stable JSON

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod concurrency;
pub mod errors;

pub use concurrency::CancellationToken;
pub use errors::{ErrorCategory, ErrorCode, FailureReport, ReportMetadata};
