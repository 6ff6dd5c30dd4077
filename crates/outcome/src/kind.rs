//! Closed failure families.

use fallible_shared::{ErrorCode, FailureReport};
use std::fmt;

/// A closed, named set of failure variants.
///
/// The set of kinds is fixed when the implementing type is defined; there is
/// no way to register a new kind at runtime. Implement it with
/// `#[derive(FailureKind)]`:
///
/// ```
/// use fallible_outcome::FailureKind;
///
/// #[derive(Debug, FailureKind)]
/// #[failure(domain = "student")]
/// enum StudentError {
///     Invalid(String),
///     TooShort,
/// }
///
/// assert_eq!(StudentError::KINDS, &["Invalid", "TooShort"]);
/// assert_eq!(StudentError::TooShort.kind(), "TooShort");
/// assert_eq!(StudentError::domain(), "student");
/// ```
///
/// Families must be enums with at least one variant:
///
/// ```compile_fail
/// use fallible_outcome::FailureKind;
///
/// #[derive(Debug, FailureKind)]
/// struct Timeout {
///     millis: u64,
/// }
/// ```
///
/// ```compile_fail
/// use fallible_outcome::FailureKind;
///
/// #[derive(Debug, FailureKind)]
/// enum Never {}
/// ```
///
/// Kind names are unique within a family, including renamed variants:
///
/// ```compile_fail
/// use fallible_outcome::FailureKind;
///
/// #[derive(Debug, FailureKind)]
/// enum PrinterError {
///     NoToner,
///     #[failure(name = "NoToner")]
///     EmptyCartridge,
/// }
/// ```
pub trait FailureKind: fmt::Debug {
    /// Every kind name in the family, in declaration order.
    const KINDS: &'static [&'static str];

    /// Name of the failure family.
    fn domain() -> &'static str;

    /// Kind name of this value.
    fn kind(&self) -> &'static str;

    /// Returns true when this kind models cancellation.
    fn is_cancellation(&self) -> bool {
        false
    }

    /// Structured rendering: kind name plus associated data.
    fn report(&self) -> FailureReport {
        let report = FailureReport::domain(
            ErrorCode::new(Self::domain(), self.kind()),
            format!("{self:?}"),
        );
        if self.is_cancellation() {
            report.with_metadata("cancellation", "true")
        } else {
            report
        }
    }
}

impl<F: FailureKind> FailureKind for &F {
    const KINDS: &'static [&'static str] = F::KINDS;

    fn domain() -> &'static str {
        F::domain()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn is_cancellation(&self) -> bool {
        (**self).is_cancellation()
    }

    fn report(&self) -> FailureReport {
        (**self).report()
    }
}

/// Returns true when `name` is one of the kinds registered by `F`.
#[must_use]
pub fn is_registered_kind<F: FailureKind>(name: &str) -> bool {
    F::KINDS.contains(&name)
}
