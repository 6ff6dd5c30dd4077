//! Recovery patterns: a kind filter plus a handler.

use fallible_outcome::FailureKind;
use std::borrow::Cow;
use std::fmt;

/// Compiled matcher: produces a value, or hands the failure back on mismatch.
pub(crate) type Matcher<F, S> = Box<dyn Fn(F) -> Result<S, F> + Send + Sync>;

/// Which failure kinds a pattern can accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coverage {
    /// Every kind of the family.
    All,
    /// Only the listed kinds.
    Kinds(Vec<&'static str>),
}

impl Coverage {
    /// Returns true when `kind` passes the filter.
    #[must_use]
    pub fn admits(&self, kind: &str) -> bool {
        match self {
            Self::All => true,
            Self::Kinds(kinds) => kinds.iter().any(|candidate| *candidate == kind),
        }
    }
}

/// One ordered entry of a dispatcher.
///
/// A pattern is *conditional* when it carries a predicate: a conditional
/// pattern can decline a failure of a kind it covers, so it never makes a
/// later pattern unreachable.
pub struct RecoveryPattern<F, S> {
    coverage: Coverage,
    conditional: bool,
    label: Option<Cow<'static, str>>,
    matcher: Matcher<F, S>,
}

impl<F, S> RecoveryPattern<F, S>
where
    F: FailureKind + 'static,
    S: 'static,
{
    fn from_parts(coverage: Coverage, conditional: bool, matcher: Matcher<F, S>) -> Self {
        Self {
            coverage,
            conditional,
            label: None,
            matcher,
        }
    }

    /// Match one kind.
    pub fn on_kind<H>(kind: &'static str, handler: H) -> Self
    where
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        Self::on_kinds(&[kind], handler)
    }

    /// Match any of several kinds with one handler.
    pub fn on_kinds<H>(kinds: &[&'static str], handler: H) -> Self
    where
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        let accepted = kinds.to_vec();
        Self::from_parts(
            Coverage::Kinds(kinds.to_vec()),
            false,
            Box::new(move |failure: F| {
                if accepted.contains(&failure.kind()) {
                    Ok(handler(failure))
                } else {
                    Err(failure)
                }
            }),
        )
    }

    /// Match one kind when `predicate` holds for the failure.
    pub fn on_kind_where<P, H>(kind: &'static str, predicate: P, handler: H) -> Self
    where
        P: Fn(&F) -> bool + Send + Sync + 'static,
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        Self::from_parts(
            Coverage::Kinds(vec![kind]),
            true,
            Box::new(move |failure: F| {
                if failure.kind() == kind && predicate(&failure) {
                    Ok(handler(failure))
                } else {
                    Err(failure)
                }
            }),
        )
    }

    /// Match every failure.
    pub fn on_any<H>(handler: H) -> Self
    where
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        Self::from_parts(
            Coverage::All,
            false,
            Box::new(move |failure: F| Ok(handler(failure))),
        )
    }

    /// Match every failure for which `predicate` holds.
    pub fn on_any_where<P, H>(predicate: P, handler: H) -> Self
    where
        P: Fn(&F) -> bool + Send + Sync + 'static,
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        Self::from_parts(
            Coverage::All,
            true,
            Box::new(move |failure: F| {
                if predicate(&failure) {
                    Ok(handler(failure))
                } else {
                    Err(failure)
                }
            }),
        )
    }

    /// Match one kind and hand its associated data to the handler.
    ///
    /// `extract` destructures the failure, returning it unchanged when the
    /// shape does not fit; the failure then continues to later patterns.
    /// The pattern counts as unconditional for its kind, so `extract`
    /// should accept every value of that kind.
    pub fn bind<D, X, H>(kind: &'static str, extract: X, handler: H) -> Self
    where
        X: Fn(F) -> Result<D, F> + Send + Sync + 'static,
        H: Fn(D) -> S + Send + Sync + 'static,
    {
        Self::from_parts(
            Coverage::Kinds(vec![kind]),
            false,
            Box::new(move |failure: F| {
                if failure.kind() == kind {
                    extract(failure).map(&handler)
                } else {
                    Err(failure)
                }
            }),
        )
    }

    /// Attach a diagnostic label.
    #[must_use]
    pub fn labeled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl<F, S> RecoveryPattern<F, S> {
    /// Kinds this pattern can accept.
    #[must_use]
    pub const fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Returns true when the pattern carries a predicate.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        self.conditional
    }

    /// Diagnostic label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn try_handle(&self, failure: F) -> Result<S, F> {
        (self.matcher)(failure)
    }
}

impl<F, S> fmt::Debug for RecoveryPattern<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryPattern")
            .field("coverage", &self.coverage)
            .field("conditional", &self.conditional)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
