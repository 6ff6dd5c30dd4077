//! Scopes owning a stack of deferred actions.

use crate::action::{CleanupFailure, DeferredAction};
use crate::exit::ScopeExit;
use fallible_outcome::IntoOutcome;
use fallible_shared::CancellationToken;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static SCOPE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique scope identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(crate) fn next() -> Self {
        Self(SCOPE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "scope_{}", self.0)
    }
}

/// Lifecycle of a scope: `Active -> Exiting -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// Accepting registrations.
    Active,
    /// Running deferred actions.
    Exiting,
    /// Terminal.
    Closed,
}

/// A lexical extent whose exit runs its deferred actions in reverse order.
///
/// A scope is its own RAII guard. [`Scope::close`] runs the actions and
/// returns any cleanup failures; dropping a scope that was never closed
/// (for example while a panic unwinds through the body) runs them too and
/// logs the failures, since there is no caller left to hand them to.
///
/// Registration takes `&mut self`, and actions are not required to be
/// `Send`, so a scope belongs to exactly one flow of control and nothing can
/// register while the scope is exiting.
pub struct Scope<'env> {
    id: ScopeId,
    parent: Option<ScopeId>,
    depth: usize,
    state: ScopeState,
    actions: Vec<DeferredAction<'env>>,
    next_sequence: usize,
}

impl<'env> Scope<'env> {
    /// Open a standalone root scope.
    #[must_use]
    pub fn new() -> Self {
        Self::open(None, 0)
    }

    fn open(parent: Option<ScopeId>, depth: usize) -> Self {
        let id = ScopeId::next();
        tracing::trace!(scope = %id, depth, "scope opened");
        Self {
            id,
            parent,
            depth,
            state: ScopeState::Active,
            actions: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Scope identifier.
    #[must_use]
    pub const fn id(&self) -> ScopeId {
        self.id
    }

    /// Parent scope, for nested scopes.
    #[must_use]
    pub const fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Nesting depth (0 for root scopes).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ScopeState {
        self.state
    }

    /// Number of actions waiting for scope exit.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.actions.len()
    }

    /// Register an action to run when the scope exits.
    ///
    /// Closures that borrow state observe it as of exit time; use a `move`
    /// closure or [`Scope::defer_snapshot`] to capture registration-time
    /// values instead.
    pub fn defer<A>(&mut self, action: A)
    where
        A: FnOnce() + 'env,
    {
        self.push(None, Box::new(move || {
            action();
            Ok(())
        }));
    }

    /// Register a labeled action.
    pub fn defer_labeled<A>(&mut self, label: impl Into<Cow<'static, str>>, action: A)
    where
        A: FnOnce() + 'env,
    {
        self.push(
            Some(label.into()),
            Box::new(move || {
                action();
                Ok(())
            }),
        );
    }

    /// Register an action that can fail; its error becomes a cleanup failure.
    pub fn defer_fallible<A, E>(&mut self, label: impl Into<Cow<'static, str>>, action: A)
    where
        A: FnOnce() -> Result<(), E> + 'env,
        E: fmt::Display,
    {
        self.push(
            Some(label.into()),
            Box::new(move || action().map_err(|error| error.to_string())),
        );
    }

    /// Register an action over a copy of `value` taken now, at registration.
    pub fn defer_snapshot<T, A>(&mut self, value: &T, action: A)
    where
        T: Clone + 'env,
        A: FnOnce(T) + 'env,
    {
        let snapshot = value.clone();
        self.push(
            None,
            Box::new(move || {
                action(snapshot);
                Ok(())
            }),
        );
    }

    fn push(
        &mut self,
        label: Option<Cow<'static, str>>,
        run: Box<dyn FnOnce() -> Result<(), String> + 'env>,
    ) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let action = DeferredAction::new(self.id, sequence, label, run);
        tracing::trace!(scope = %self.id, sequence, label = action.label(), "action deferred");
        self.actions.push(action);
    }

    /// Return `Err(make_failure())` when `token` is cancelled.
    ///
    /// Propagating the error with `?` leaves the scope through the normal
    /// exit path, so every pending action still runs before the caller
    /// observes the cancellation.
    pub fn check_cancelled<F, M>(&self, token: &CancellationToken, make_failure: M) -> Result<(), F>
    where
        M: FnOnce() -> F,
    {
        if token.is_cancelled() {
            tracing::debug!(scope = %self.id, pending = self.actions.len(), "cancellation observed");
            Err(make_failure())
        } else {
            Ok(())
        }
    }

    /// Run `body` in a child scope that is closed before this call returns.
    pub fn nested<'inner, O, Body>(&self, body: Body) -> ScopeExit<O::Success, O::Failure>
    where
        O: IntoOutcome,
        Body: FnOnce(&mut Scope<'inner>) -> O,
    {
        run_scope(Scope::open(Some(self.id), self.depth + 1), body)
    }

    /// Run every pending action in reverse registration order and close.
    pub fn close(mut self) -> Vec<CleanupFailure> {
        self.exit()
    }

    fn exit(&mut self) -> Vec<CleanupFailure> {
        if self.state == ScopeState::Closed {
            return Vec::new();
        }
        self.state = ScopeState::Exiting;
        let total = self.actions.len();
        let mut failures = Vec::new();

        while let Some(action) = self.actions.pop() {
            let sequence = action.sequence();
            match action.invoke() {
                Ok(()) => {
                    tracing::trace!(scope = %self.id, sequence, "deferred action ran");
                },
                Err(failure) => {
                    tracing::debug!(scope = %self.id, sequence, error = %failure, "deferred action failed");
                    failures.push(failure);
                },
            }
        }

        self.state = ScopeState::Closed;
        tracing::debug!(
            scope = %self.id,
            actions = total,
            failures = failures.len(),
            "scope closed"
        );
        failures
    }
}

impl Default for Scope<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        if self.state == ScopeState::Closed {
            return;
        }
        for failure in self.exit() {
            tracing::warn!(
                scope = %failure.scope,
                label = %failure.label,
                error = %failure.cause,
                "deferred action failed while scope was dropped"
            );
        }
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("depth", &self.depth)
            .field("state", &self.state)
            .field("pending", &self.actions.len())
            .finish()
    }
}

/// Run `body` in a fresh root scope, then close it.
///
/// The body may return an [`fallible_outcome::Outcome`] or a `Result`, and
/// may leave early with `return` or `?`; every exit path runs the deferred
/// actions, in reverse order, before the [`ScopeExit`] is returned.
///
/// ```
/// use fallible_defer::scoped;
/// use fallible_outcome::{FailureKind, Outcome};
/// use std::cell::RefCell;
///
/// #[derive(Debug, FailureKind)]
/// enum Never {
///     Unreachable,
/// }
///
/// let log = RefCell::new(Vec::new());
/// let exit = scoped(|scope| {
///     scope.defer(|| log.borrow_mut().push("A"));
///     scope.defer(|| log.borrow_mut().push("B"));
///     scope.defer(|| log.borrow_mut().push("C"));
///     Outcome::<_, Never>::success(())
/// });
///
/// assert!(exit.is_clean());
/// assert_eq!(*log.borrow(), ["C", "B", "A"]);
/// ```
pub fn scoped<'env, O, Body>(body: Body) -> ScopeExit<O::Success, O::Failure>
where
    O: IntoOutcome,
    Body: FnOnce(&mut Scope<'env>) -> O,
{
    run_scope(Scope::new(), body)
}

fn run_scope<'env, O, Body>(mut scope: Scope<'env>, body: Body) -> ScopeExit<O::Success, O::Failure>
where
    O: IntoOutcome,
    Body: FnOnce(&mut Scope<'env>) -> O,
{
    let outcome = body(&mut scope).into_outcome();
    let id = scope.id();
    let cleanup = scope.close();
    ScopeExit::new(id, outcome, cleanup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExitCause;
    use fallible_outcome::{FailureKind, Outcome};
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, Clone, PartialEq, Eq, FailureKind)]
    #[failure(domain = "log")]
    enum LogError {
        Disaster(&'static str),
        #[failure(cancellation)]
        Cancelled,
    }

    #[test]
    fn actions_run_in_reverse_registration_order() {
        let log = RefCell::new(Vec::new());
        let exit = scoped(|scope| {
            scope.defer(|| log.borrow_mut().push("A"));
            scope.defer(|| log.borrow_mut().push("B"));
            scope.defer(|| log.borrow_mut().push("C"));
            Outcome::<_, LogError>::success(())
        });

        assert!(exit.is_clean());
        assert_eq!(*log.borrow(), ["C", "B", "A"]);
    }

    #[test]
    fn actions_run_before_result_is_handed_back() {
        let steps = RefCell::new(vec!["step 1"]);
        let exit = scoped(|scope| {
            steps.borrow_mut().push("step 2");
            scope.defer(|| steps.borrow_mut().push("step 3"));
            steps.borrow_mut().push("step 4");
            Outcome::<_, LogError>::success(())
        });
        steps.borrow_mut().push("step 5");

        assert!(exit.is_clean());
        assert_eq!(
            *steps.borrow(),
            ["step 1", "step 2", "step 4", "step 3", "step 5"]
        );
    }

    #[test]
    fn returned_value_is_computed_before_live_actions_mutate_state() {
        let a = RefCell::new(String::from("Hello"));
        let exit = scoped(|scope| {
            scope.defer(|| a.borrow_mut().push_str(" world"));
            Outcome::<_, LogError>::success(a.borrow().clone())
        });

        assert_eq!(exit.into_outcome(), Outcome::Success("Hello".to_owned()));
        assert_eq!(*a.borrow(), "Hello world");
    }

    #[test]
    fn live_capture_sees_exit_time_value_and_snapshot_sees_registration_value() {
        let counter = Cell::new(1);
        let live = Cell::new(0);
        let snapshot = Cell::new(0);
        let exit = scoped(|scope| {
            scope.defer(|| live.set(counter.get()));
            scope.defer_snapshot(&counter.get(), |value| snapshot.set(value));
            counter.set(42);
            Outcome::<_, LogError>::success(())
        });

        assert!(exit.is_clean());
        assert_eq!(live.get(), 42);
        assert_eq!(snapshot.get(), 1);
    }

    #[test]
    fn early_exit_with_question_mark_runs_cleanup() {
        let closed = Cell::new(false);
        let written = RefCell::new(Vec::new());
        let fetch = |status: &'static str| -> Result<&'static str, LogError> {
            if status == "disaster" {
                Err(LogError::Disaster(status))
            } else {
                Ok(status)
            }
        };

        let exit = scoped(|scope| {
            scope.defer_labeled("close-file", || closed.set(true));
            written.borrow_mut().push(fetch("hardware ok")?);
            written.borrow_mut().push(fetch("disaster")?);
            written.borrow_mut().push(fetch("network ok")?);
            Ok::<_, LogError>(())
        });

        assert_eq!(exit.cause(), ExitCause::Failed);
        assert!(closed.get());
        assert_eq!(*written.borrow(), ["hardware ok"]);
    }

    #[test]
    fn failing_action_does_not_skip_the_rest() {
        let log = RefCell::new(Vec::new());
        let exit = scoped(|scope| {
            scope.defer_labeled("first", || log.borrow_mut().push("first"));
            scope.defer_fallible("flaky", || Err::<(), _>("flush failed"));
            scope.defer_labeled("last", || log.borrow_mut().push("last"));
            Outcome::<(), _>::failure(LogError::Disaster("boom"))
        });

        assert_eq!(*log.borrow(), ["last", "first"]);
        assert_eq!(exit.cleanup_failures().len(), 1);
        assert_eq!(
            exit.cleanup_failures().first().map(|failure| failure.label.as_str()),
            Some("flaky")
        );
        let report = exit.report();
        assert_eq!(
            report.as_ref().map(|report| report.code.to_string()),
            Some("log:Disaster".to_owned())
        );
        assert_eq!(report.map(|report| report.secondary.len()), Some(1));
    }

    #[test]
    fn panicking_action_is_captured_and_others_run() {
        let ran = Cell::new(0);
        let exit = scoped(|scope| {
            scope.defer(|| ran.set(ran.get() + 1));
            scope.defer(|| panic!("cleanup exploded"));
            scope.defer(|| ran.set(ran.get() + 1));
            Outcome::<_, LogError>::success(7)
        });

        assert_eq!(ran.get(), 2);
        assert!(exit.cleanup_failures().iter().all(CleanupFailure::is_panic));
        assert_eq!(exit.cause(), ExitCause::Completed);
    }

    #[test]
    fn unwinding_body_still_runs_actions() {
        let closed = Cell::new(false);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scoped(|scope| {
                scope.defer(|| closed.set(true));
                if closed.get() {
                    return Outcome::<(), LogError>::success(());
                }
                panic!("body failed hard");
            })
        }));

        assert!(result.is_err());
        assert!(closed.get());
    }

    #[test]
    fn nested_scope_closes_before_parent_continues() {
        let log = RefCell::new(Vec::new());
        let exit = scoped(|scope| {
            scope.defer(|| log.borrow_mut().push("outer"));
            let parent = scope.id();
            let inner = scope.nested(|child| {
                assert_eq!(child.parent(), Some(parent));
                assert_eq!(child.depth(), 1);
                child.defer(|| log.borrow_mut().push("inner"));
                Outcome::<_, LogError>::success(())
            });
            assert!(inner.is_clean());
            log.borrow_mut().push("after inner");
            Outcome::<_, LogError>::success(())
        });

        assert!(exit.is_clean());
        assert_eq!(*log.borrow(), ["inner", "after inner", "outer"]);
    }

    #[test]
    fn per_iteration_scopes_run_each_iteration() {
        let log = RefCell::new(Vec::new());
        for i in 1..=3 {
            let exit = scoped(|scope| {
                log.borrow_mut().push(format!("In {i}"));
                scope.defer(|| log.borrow_mut().push(format!("Deferred {i}")));
                log.borrow_mut().push(format!("Out {i}"));
                Outcome::<_, LogError>::success(())
            });
            assert!(exit.is_clean());
        }

        assert_eq!(
            *log.borrow(),
            [
                "In 1", "Out 1", "Deferred 1", "In 2", "Out 2", "Deferred 2", "In 3", "Out 3",
                "Deferred 3"
            ]
        );
    }

    #[test]
    fn cancellation_exits_through_cleanup() {
        let token = CancellationToken::new();
        let released = Cell::new(false);
        token.cancel();

        let exit = scoped(|scope| {
            scope.defer_labeled("release", || released.set(true));
            scope.check_cancelled(&token, || LogError::Cancelled)?;
            Ok::<_, LogError>(())
        });

        assert!(released.get());
        assert_eq!(exit.cause(), ExitCause::Cancelled);
    }

    #[test]
    fn standalone_scope_tracks_state_and_drop_runs_actions() {
        let ran = Cell::new(false);
        {
            let mut scope = Scope::new();
            assert_eq!(scope.state(), ScopeState::Active);
            scope.defer(|| ran.set(true));
            assert_eq!(scope.pending(), 1);
        }
        assert!(ran.get());

        let mut scope = Scope::new();
        scope.defer_fallible("fails", || Err::<(), _>("nope"));
        let failures = scope.close();
        assert_eq!(failures.len(), 1);
    }

    proptest! {
        #[test]
        fn n_actions_run_exactly_reversed(count in 0usize..64) {
            let log = RefCell::new(Vec::new());
            let exit = scoped(|scope| {
                for index in 0..count {
                    let log = &log;
                    scope.defer(move || log.borrow_mut().push(index));
                }
                Outcome::<_, LogError>::success(())
            });

            let expected: Vec<usize> = (0..count).rev().collect();
            prop_assert!(exit.is_clean());
            prop_assert_eq!(log.into_inner(), expected);
        }

        #[test]
        fn one_failing_action_leaves_the_others(count in 1usize..32, failing in 0usize..32) {
            let failing = failing % count;
            let ran = Cell::new(0usize);
            let exit = scoped(|scope| {
                for index in 0..count {
                    let ran = &ran;
                    scope.defer_fallible(format!("action-{index}"), move || {
                        if index == failing {
                            Err("failed")
                        } else {
                            ran.set(ran.get() + 1);
                            Ok(())
                        }
                    });
                }
                Outcome::<(), _>::failure(LogError::Disaster("primary"))
            });

            prop_assert_eq!(ran.get(), count - 1);
            prop_assert_eq!(exit.cleanup_failures().len(), 1);
            prop_assert_eq!(exit.cause(), ExitCause::Failed);
        }
    }
}
