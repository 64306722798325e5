//! Execution engine: runs a protected operation under a policy chain.
//!
//! Semantics, one pass per execution:
//! 1. Run the protected operation.
//! 2. On success, run the success hook (if any) with the produced value.
//! 3. On error, select the first clause whose categories cover the error and
//!    apply its action. Consume/supply handlers recover; a transform raises its
//!    new error without re-matching it; an unmatched error propagates unchanged.
//! 4. Run the cleanup hook (if any), exactly once, whatever happened above.
//! 5. Release the resource scope in reverse acquisition order.
//! 6. Surface the value or the single winning error.
//!
//! Invariants:
//! - Handling and success are mutually exclusive: the success hook never runs
//!   after a clause recovered.
//! - A later failure supersedes a pending one: release beats cleanup, cleanup
//!   beats handler/transform/hook errors, which beat the original error.
//!   Superseded errors are logged, never silently dropped.
//! - Errors are never wrapped; an unmatched error is returned as the same value.

use crate::category::{first_match, Categorized};
use crate::clause::{Action, Clause};
use crate::resource::ResourceScope;
use crate::telemetry::{ChainEvent, EventSink, Hook, Stage};

pub(crate) type SuccessHook<'a, T, E> = Box<dyn FnOnce(&T) -> Result<(), E> + 'a>;
pub(crate) type CleanupHook<'a, E> = Box<dyn FnOnce() -> Result<(), E> + 'a>;

/// Ordered clauses plus optional success and cleanup hooks.
pub(crate) struct PolicyChain<'a, T, E: Categorized> {
    clauses: Vec<Clause<'a, T, E>>,
    on_success: Option<SuccessHook<'a, T, E>>,
    on_cleanup: Option<CleanupHook<'a, E>>,
}

impl<'a, T, E: Categorized> PolicyChain<'a, T, E> {
    pub(crate) fn new() -> Self {
        Self { clauses: Vec::new(), on_success: None, on_cleanup: None }
    }

    /// Number of clauses appended so far; also the position of the next one.
    pub(crate) fn len(&self) -> usize {
        self.clauses.len()
    }

    pub(crate) fn push(&mut self, clause: Clause<'a, T, E>) {
        self.clauses.push(clause);
    }

    pub(crate) fn set_success(&mut self, hook: SuccessHook<'a, T, E>) {
        debug_assert!(self.on_success.is_none(), "success hook installed twice");
        self.on_success = Some(hook);
    }

    pub(crate) fn set_cleanup(&mut self, hook: CleanupHook<'a, E>) {
        debug_assert!(self.on_cleanup.is_none(), "cleanup hook installed twice");
        self.on_cleanup = Some(hook);
    }

    /// Run `operation` under this chain, then clean up and release `scope`.
    pub(crate) fn execute<Op>(
        self,
        operation: Op,
        mut scope: ResourceScope<'a, E>,
        sink: &dyn EventSink,
    ) -> Result<T, E>
    where
        Op: FnOnce() -> Result<T, E>,
    {
        debug_assert!(!self.clauses.is_empty(), "policy chain without clauses");
        let span = tracing::debug_span!(
            target: "raises::engine",
            "policy_chain",
            clauses = self.clauses.len(),
            resources = scope.len()
        );
        let _entered = span.enter();

        let PolicyChain { clauses, on_success, on_cleanup } = self;

        let outcome = match operation() {
            Ok(value) => succeed(value, on_success, sink),
            Err(error) => dispatch(clauses, error, sink),
        };

        let outcome = match on_cleanup {
            Some(cleanup) => match cleanup() {
                Ok(()) => outcome,
                Err(error) => {
                    sink.emit(ChainEvent::HookFailed { hook: Hook::Cleanup });
                    supersede(outcome, error, Stage::Cleanup, sink)
                }
            },
            None => outcome,
        };

        let report = scope.release_all();
        if report.released > 0 {
            sink.emit(ChainEvent::Released { released: report.released, failed: report.failed });
        }
        match report.error {
            Some(error) => supersede(outcome, error, Stage::Release, sink),
            None => outcome,
        }
    }
}

fn succeed<'a, T, E>(
    value: T,
    on_success: Option<SuccessHook<'a, T, E>>,
    sink: &dyn EventSink,
) -> Result<T, E> {
    tracing::debug!(target: "raises::engine", "protected operation succeeded");
    sink.emit(ChainEvent::Succeeded);
    match on_success {
        Some(hook) => match hook(&value) {
            Ok(()) => Ok(value),
            Err(error) => {
                sink.emit(ChainEvent::HookFailed { hook: Hook::Success });
                Err(error)
            }
        },
        None => Ok(value),
    }
}

fn dispatch<'a, T, E: Categorized>(
    clauses: Vec<Clause<'a, T, E>>,
    error: E,
    sink: &dyn EventSink,
) -> Result<T, E> {
    let matched = first_match(clauses.iter().map(Clause::categories), &error);
    let selected = matched.and_then(|index| clauses.into_iter().nth(index).map(|c| (index, c)));
    let Some((index, clause)) = selected else {
        tracing::debug!(target: "raises::engine", error = ?error, "no clause covers raised error");
        sink.emit(ChainEvent::Unmatched);
        return Err(error);
    };

    tracing::debug!(
        target: "raises::engine",
        clause = index,
        categories = ?clause.categories(),
        error = ?error,
        "clause selected"
    );
    match clause.into_action() {
        Action::Recover { kind, handler } => match handler(error) {
            Ok(value) => {
                sink.emit(ChainEvent::Handled { clause: index, action: kind });
                Ok(value)
            }
            Err(error) => {
                sink.emit(ChainEvent::HookFailed { hook: Hook::Handler });
                Err(error)
            }
        },
        Action::Transform(transform) => {
            sink.emit(ChainEvent::Transformed { clause: index });
            Err(transform(error))
        }
    }
}

/// Replace whatever `outcome` would surface with `error`, logging a discarded error.
fn supersede<T, E: Categorized>(
    outcome: Result<T, E>,
    error: E,
    stage: Stage,
    sink: &dyn EventSink,
) -> Result<T, E> {
    if let Err(pending) = outcome {
        tracing::warn!(
            target: "raises::engine",
            stage = %stage,
            superseded = ?pending,
            by = ?error,
            "pending error superseded"
        );
        sink.emit(ChainEvent::Superseded { stage });
    }
    Err(error)
}
