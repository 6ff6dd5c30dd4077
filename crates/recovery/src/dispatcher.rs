//! Ordered recovery dispatch.

use crate::lint::{self, LintPolicy, PatternLint};
use crate::pattern::{Coverage, RecoveryPattern};
use fallible_outcome::{FailureKind, IntoOutcome, Outcome};
use fallible_shared::{ErrorCode, FailureReport};
use std::fmt;
use std::future::Future;

type Fallback<F, S> = Box<dyn Fn(F) -> S + Send + Sync>;

/// Wiring mistakes caught when a dispatcher is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchConfigError {
    /// No fallback handler was provided.
    #[error("dispatcher for `{domain}` has no fallback handler")]
    MissingFallback {
        /// Failure family.
        domain: &'static str,
    },
    /// A pattern names a kind the family does not register.
    #[error("pattern #{index} names unknown kind `{kind}` of `{domain}`")]
    UnknownKind {
        /// Failure family.
        domain: &'static str,
        /// Offending pattern.
        index: usize,
        /// Unregistered kind name.
        kind: &'static str,
    },
    /// An unreachable pattern under [`LintPolicy::Deny`].
    #[error("dispatcher for `{domain}` has a dead pattern: {lint}")]
    DeadPattern {
        /// Failure family.
        domain: &'static str,
        /// The lint that was denied.
        lint: PatternLint,
    },
}

impl DispatchConfigError {
    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingFallback { .. } => ErrorCode::missing_fallback(),
            Self::UnknownKind { .. } => ErrorCode::new("dispatch", "unknown_kind"),
            Self::DeadPattern { .. } => ErrorCode::new("dispatch", "dead_pattern"),
        }
    }

    /// Structured rendering in the configuration category.
    #[must_use]
    pub fn report(&self) -> FailureReport {
        let domain = match self {
            Self::MissingFallback { domain }
            | Self::UnknownKind { domain, .. }
            | Self::DeadPattern { domain, .. } => *domain,
        };
        FailureReport::configuration(self.code(), self.to_string()).with_metadata("domain", domain)
    }
}

/// Which branch produced a resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBy {
    /// The outcome was already a success; no pattern ran.
    Success,
    /// The pattern at `index` handled the failure.
    Pattern {
        /// Position in declaration order.
        index: usize,
        /// Pattern label, if any.
        label: Option<String>,
    },
    /// No pattern matched; the fallback handled the failure.
    Fallback,
}

/// A resolved value plus the branch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<S> {
    /// Resolved value.
    pub value: S,
    /// Branch taken.
    pub resolved_by: ResolvedBy,
}

/// Ordered patterns plus a mandatory fallback.
///
/// Patterns are tried top to bottom and the first match wins; order is the
/// only disambiguator. A built dispatcher never fails: every failure is
/// handled by some pattern or by the fallback.
///
/// ```
/// use fallible_outcome::{FailureKind, Outcome};
/// use fallible_recovery::Dispatcher;
///
/// #[derive(Debug, FailureKind)]
/// enum DivisionError {
///     DividedByZero,
/// }
///
/// let dispatcher = Dispatcher::builder()
///     .on_kind("DividedByZero", |_| "Error: Denominator cannot be 0".to_owned())
///     .fallback(|error: DivisionError| format!("Error: {error:?}"))
///     .build()?;
///
/// let message = dispatcher.attempt(|| {
///     Outcome::<i32, _>::failure(DivisionError::DividedByZero).map_success(|v| v.to_string())
/// });
/// assert_eq!(message, "Error: Denominator cannot be 0");
/// # Ok::<(), fallible_recovery::DispatchConfigError>(())
/// ```
pub struct Dispatcher<F, S> {
    patterns: Vec<RecoveryPattern<F, S>>,
    fallback: Fallback<F, S>,
    lints: Vec<PatternLint>,
    log_fallback: bool,
}

impl<F, S> Dispatcher<F, S>
where
    F: FailureKind + 'static,
    S: 'static,
{
    /// Start an empty builder.
    pub fn builder() -> DispatcherBuilder<F, S> {
        DispatcherBuilder::new()
    }

    /// Run `op` and resolve its outcome.
    pub fn attempt<O, Op>(&self, op: Op) -> S
    where
        O: IntoOutcome<Success = S, Failure = F>,
        Op: FnOnce() -> O,
    {
        self.resolve(op())
    }

    /// Await `operation` and resolve its outcome.
    pub async fn attempt_async<O, Fut>(&self, operation: Fut) -> S
    where
        O: IntoOutcome<Success = S, Failure = F>,
        Fut: Future<Output = O>,
    {
        self.resolve(operation.await)
    }

    /// Resolve an outcome to a value.
    pub fn resolve<O>(&self, outcome: O) -> S
    where
        O: IntoOutcome<Success = S, Failure = F>,
    {
        self.resolve_traced(outcome).value
    }

    /// Resolve an outcome and report which branch produced the value.
    pub fn resolve_traced<O>(&self, outcome: O) -> Resolution<S>
    where
        O: IntoOutcome<Success = S, Failure = F>,
    {
        let mut failure = match outcome.into_outcome() {
            Outcome::Success(value) => {
                return Resolution {
                    value,
                    resolved_by: ResolvedBy::Success,
                };
            },
            Outcome::Failure(failure) => failure,
        };

        for (index, pattern) in self.patterns.iter().enumerate() {
            if !pattern.coverage().admits(failure.kind()) {
                continue;
            }
            match pattern.try_handle(failure) {
                Ok(value) => {
                    tracing::debug!(
                        domain = F::domain(),
                        pattern = index,
                        label = pattern.label().unwrap_or_default(),
                        "failure recovered by pattern"
                    );
                    return Resolution {
                        value,
                        resolved_by: ResolvedBy::Pattern {
                            index,
                            label: pattern.label().map(str::to_owned),
                        },
                    };
                },
                Err(declined) => failure = declined,
            }
        }

        if self.log_fallback {
            tracing::warn!(domain = F::domain(), kind = failure.kind(), "failure reached fallback");
        } else {
            tracing::debug!(domain = F::domain(), kind = failure.kind(), "failure reached fallback");
        }
        Resolution {
            value: (self.fallback)(failure),
            resolved_by: ResolvedBy::Fallback,
        }
    }
}

impl<F, S> Dispatcher<F, S> {
    /// Lints computed at build time.
    #[must_use]
    pub fn lints(&self) -> &[PatternLint] {
        &self.lints
    }

    /// Number of patterns, excluding the fallback.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true when only the fallback is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl<F, S> fmt::Debug for Dispatcher<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("patterns", &self.patterns)
            .field("lints", &self.lints)
            .field("log_fallback", &self.log_fallback)
            .finish_non_exhaustive()
    }
}

/// Collects patterns in declaration order.
pub struct DispatcherBuilder<F, S> {
    patterns: Vec<RecoveryPattern<F, S>>,
    fallback: Option<Fallback<F, S>>,
    lint_policy: LintPolicy,
    log_fallback: bool,
}

impl<F, S> DispatcherBuilder<F, S>
where
    F: FailureKind + 'static,
    S: 'static,
{
    /// Empty builder with the default lint policy.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            fallback: None,
            lint_policy: LintPolicy::default(),
            log_fallback: false,
        }
    }

    /// Append a pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: RecoveryPattern<F, S>) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Append several patterns, keeping their order.
    #[must_use]
    pub fn patterns(mut self, patterns: impl IntoIterator<Item = RecoveryPattern<F, S>>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    /// Append [`RecoveryPattern::on_kind`].
    #[must_use]
    pub fn on_kind<H>(self, kind: &'static str, handler: H) -> Self
    where
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        self.pattern(RecoveryPattern::on_kind(kind, handler))
    }

    /// Append [`RecoveryPattern::on_kinds`].
    #[must_use]
    pub fn on_kinds<H>(self, kinds: &[&'static str], handler: H) -> Self
    where
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        self.pattern(RecoveryPattern::on_kinds(kinds, handler))
    }

    /// Append [`RecoveryPattern::on_kind_where`].
    #[must_use]
    pub fn on_kind_where<P, H>(self, kind: &'static str, predicate: P, handler: H) -> Self
    where
        P: Fn(&F) -> bool + Send + Sync + 'static,
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        self.pattern(RecoveryPattern::on_kind_where(kind, predicate, handler))
    }

    /// Append [`RecoveryPattern::on_any`].
    #[must_use]
    pub fn on_any<H>(self, handler: H) -> Self
    where
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        self.pattern(RecoveryPattern::on_any(handler))
    }

    /// Append [`RecoveryPattern::on_any_where`].
    #[must_use]
    pub fn on_any_where<P, H>(self, predicate: P, handler: H) -> Self
    where
        P: Fn(&F) -> bool + Send + Sync + 'static,
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        self.pattern(RecoveryPattern::on_any_where(predicate, handler))
    }

    /// Append [`RecoveryPattern::bind`].
    #[must_use]
    pub fn bind<D, X, H>(self, kind: &'static str, extract: X, handler: H) -> Self
    where
        X: Fn(F) -> Result<D, F> + Send + Sync + 'static,
        H: Fn(D) -> S + Send + Sync + 'static,
    {
        self.pattern(RecoveryPattern::bind(kind, extract, handler))
    }

    /// Set the handler for failures no pattern matches.
    #[must_use]
    pub fn fallback<H>(mut self, handler: H) -> Self
    where
        H: Fn(F) -> S + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Choose what happens to unreachable-pattern lints.
    #[must_use]
    pub const fn lint_policy(mut self, policy: LintPolicy) -> Self {
        self.lint_policy = policy;
        self
    }

    /// Log fallback use at `warn` instead of `debug`.
    #[must_use]
    pub const fn log_fallback(mut self, enabled: bool) -> Self {
        self.log_fallback = enabled;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<Dispatcher<F, S>, DispatchConfigError> {
        let domain = F::domain();
        let fallback = self
            .fallback
            .ok_or(DispatchConfigError::MissingFallback { domain })?;

        for (index, pattern) in self.patterns.iter().enumerate() {
            let Coverage::Kinds(kinds) = pattern.coverage() else {
                continue;
            };
            if let Some(kind) = kinds.iter().copied().find(|kind| !F::KINDS.contains(kind)) {
                return Err(DispatchConfigError::UnknownKind {
                    domain,
                    index,
                    kind,
                });
            }
        }

        let lints = lint::check(&self.patterns, F::KINDS);
        for found in &lints {
            // The fallback is mandatory, so exhaustive patterns only make it idle.
            if matches!(found, PatternLint::FallbackUnreachable { .. }) {
                tracing::debug!(domain, lint = %found, "fallback is unreachable");
                continue;
            }
            match self.lint_policy {
                LintPolicy::Allow => {},
                LintPolicy::Warn => tracing::warn!(domain, lint = %found, "unreachable recovery pattern"),
                LintPolicy::Deny => {
                    return Err(DispatchConfigError::DeadPattern {
                        domain,
                        lint: *found,
                    });
                },
            }
        }

        tracing::debug!(domain, patterns = self.patterns.len(), lints = lints.len(), "dispatcher built");
        Ok(Dispatcher {
            patterns: self.patterns,
            fallback,
            lints,
            log_fallback: self.log_fallback,
        })
    }
}

impl<F, S> Default for DispatcherBuilder<F, S>
where
    F: FailureKind + 'static,
    S: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot dispatch: run `op`, then resolve with `patterns` and `fallback`.
///
/// The fallback is a required argument, so only an unknown kind can make
/// this fail.
pub fn attempt<F, S, O, Op, H>(
    op: Op,
    patterns: impl IntoIterator<Item = RecoveryPattern<F, S>>,
    fallback: H,
) -> Result<S, DispatchConfigError>
where
    F: FailureKind + 'static,
    S: 'static,
    O: IntoOutcome<Success = S, Failure = F>,
    Op: FnOnce() -> O,
    H: Fn(F) -> S + Send + Sync + 'static,
{
    let dispatcher = Dispatcher::builder()
        .patterns(patterns)
        .fallback(fallback)
        .build()?;
    Ok(dispatcher.attempt(op))
}
