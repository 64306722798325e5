//! Fluent policy chain builder.
//!
//! The builder is a small state machine whose states are distinct types, so only
//! legal call sequences compile:
//!
//! ```text
//! Protected ──if_raises──▶ Pending ──then_*──▶ Chain ──else_if_raises──▶ Pending …
//!                                               │
//!                                               ├──else_call──▶ Guarded ──done / finally_done
//!                                               └──done / finally_done
//! ```
//!
//! - A success hook (`else_call`) can only follow at least one clause and can
//!   only be installed once.
//! - `then_call` exists only for no-result actions ([`Unit`]); `then_get` only
//!   for value-producing computations ([`Value`]). `then_throw` exists for both.
//! - Nothing runs until a terminal call (`done`, `finally_done`,
//!   `finally_try_done`).
//!
//! Example
//! ```rust
//! use raises::{compute, Categorized, Category};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Kind { Input, Empty, Overflow }
//!
//! impl Category for Kind {
//!     fn parent(&self) -> Option<Self> {
//!         match self {
//!             Kind::Empty => Some(Kind::Input),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct ParseError(Kind);
//!
//! impl Categorized for ParseError {
//!     type Category = Kind;
//!     fn category(&self) -> Kind { self.0 }
//! }
//!
//! let value = compute(|| Err::<u32, _>(ParseError(Kind::Empty)))
//!     .if_raises(Kind::Input)
//!     .then_get(|_| 0)
//!     .else_if_raises(Kind::Overflow)
//!     .then_get(|_| u32::MAX)
//!     .done();
//! assert_eq!(value, Ok(0));
//! ```

use crate::category::Categorized;
use crate::clause::{Action, ActionKind, Clause};
use crate::engine::PolicyChain;
use crate::error::BuildError;
use crate::resource::ResourceScope;
use crate::telemetry::{EventSink, NullSink};
use std::fmt;
use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// Result shape of a protected operation.
pub trait Shape: sealed::Sealed {
    type Output;
}

/// Shape of a protected action that produces no value.
#[derive(Debug)]
pub enum Unit {}

/// Shape of a protected computation producing a `T`.
pub struct Value<T>(PhantomData<fn() -> T>);

impl<T> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Value")
    }
}

impl sealed::Sealed for Unit {}
impl<T> sealed::Sealed for Value<T> {}

impl Shape for Unit {
    type Output = ();
}

impl<T> Shape for Value<T> {
    type Output = T;
}

pub(crate) type Operation<'a, T, E> = Box<dyn FnOnce() -> Result<T, E> + 'a>;

/// Everything accumulated so far; executed by the terminal call.
struct Draft<'a, S: Shape, E: Categorized> {
    operation: Operation<'a, S::Output, E>,
    chain: PolicyChain<'a, S::Output, E>,
    scope: ResourceScope<'a, E>,
    sink: Box<dyn EventSink + 'a>,
}

impl<'a, S: Shape, E: Categorized> Draft<'a, S, E> {
    fn categories<I>(&self, categories: I) -> Result<Vec<E::Category>, BuildError>
    where
        I: IntoIterator<Item = E::Category>,
    {
        let categories: Vec<E::Category> = categories.into_iter().collect();
        if categories.is_empty() {
            return Err(BuildError::EmptyCategories { clause: self.chain.len() });
        }
        Ok(categories)
    }

    fn run(self) -> Result<S::Output, E> {
        let Draft { operation, chain, scope, sink } = self;
        chain.execute(operation, scope, &*sink)
    }
}

impl<'a, S: Shape, E: Categorized> fmt::Debug for Draft<'a, S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draft")
            .field("clauses", &self.chain.len())
            .field("scope", &self.scope)
            .field("sink", &self.sink)
            .finish()
    }
}

/// A protected operation with no clauses yet.
#[must_use = "a protected operation does nothing until a chain is built and `done` is called"]
#[derive(Debug)]
pub struct Protected<'a, S: Shape, E: Categorized> {
    draft: Draft<'a, S, E>,
}

/// A clause whose categories are known but whose action is not.
#[must_use = "a clause needs an action: then_call, then_get or then_throw"]
#[derive(Debug)]
pub struct Pending<'a, S: Shape, E: Categorized> {
    draft: Draft<'a, S, E>,
    categories: Vec<E::Category>,
}

/// A chain with at least one complete clause.
#[must_use = "a policy chain does nothing until `done` or `finally_done` is called"]
#[derive(Debug)]
pub struct Chain<'a, S: Shape, E: Categorized> {
    draft: Draft<'a, S, E>,
}

/// A chain with its success hook installed; only terminal calls remain.
#[must_use = "a policy chain does nothing until `done` or `finally_done` is called"]
#[derive(Debug)]
pub struct Guarded<'a, S: Shape, E: Categorized> {
    draft: Draft<'a, S, E>,
}

impl<'a, S: Shape, E: Categorized> Protected<'a, S, E> {
    pub(crate) fn new(
        operation: Operation<'a, S::Output, E>,
        scope: ResourceScope<'a, E>,
    ) -> Self {
        Self {
            draft: Draft { operation, chain: PolicyChain::new(), scope, sink: Box::new(NullSink) },
        }
    }

    /// Report execution events to `sink` instead of discarding them.
    pub fn with_sink<K>(mut self, sink: K) -> Self
    where
        K: EventSink + 'a,
    {
        self.draft.sink = Box::new(sink);
        self
    }

    /// Start the first clause, covering `category`.
    pub fn if_raises(self, category: E::Category) -> Pending<'a, S, E> {
        Pending { draft: self.draft, categories: vec![category] }
    }

    /// Start the first clause, covering every category in `categories`.
    pub fn if_raises_any<I>(self, categories: I) -> Result<Pending<'a, S, E>, BuildError>
    where
        I: IntoIterator<Item = E::Category>,
    {
        let categories = self.draft.categories(categories)?;
        Ok(Pending { draft: self.draft, categories })
    }
}

impl<'a, S: Shape, E: Categorized> Pending<'a, S, E> {
    /// Also cover `category` in this clause.
    pub fn or(mut self, category: E::Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Raise `transform(error)` instead of the matched error.
    ///
    /// The new error propagates after cleanup and release; it is not matched
    /// against the chain again.
    pub fn then_throw<F>(self, transform: F) -> Chain<'a, S, E>
    where
        F: FnOnce(E) -> E + 'a,
    {
        self.complete(Action::Transform(Box::new(transform)))
    }

    fn complete(self, action: Action<'a, S::Output, E>) -> Chain<'a, S, E> {
        let Pending { mut draft, categories } = self;
        draft.chain.push(Clause::new(categories, action));
        Chain { draft }
    }
}

impl<'a, E: Categorized> Pending<'a, Unit, E> {
    /// Handle the matched error for its side effect.
    pub fn then_call<F>(self, handler: F) -> Chain<'a, Unit, E>
    where
        F: FnOnce(E) + 'a,
    {
        self.complete(Action::Recover {
            kind: ActionKind::Consume,
            handler: Box::new(move |error| {
                handler(error);
                Ok(())
            }),
        })
    }

    /// Handle the matched error with a handler that may itself fail.
    pub fn then_try_call<F>(self, handler: F) -> Chain<'a, Unit, E>
    where
        F: FnOnce(E) -> Result<(), E> + 'a,
    {
        self.complete(Action::Recover { kind: ActionKind::Consume, handler: Box::new(handler) })
    }
}

impl<'a, T, E: Categorized> Pending<'a, Value<T>, E> {
    /// Handle the matched error by supplying a replacement value.
    pub fn then_get<F>(self, supply: F) -> Chain<'a, Value<T>, E>
    where
        F: FnOnce(E) -> T + 'a,
    {
        self.complete(Action::Recover {
            kind: ActionKind::Supply,
            handler: Box::new(move |error| Ok(supply(error))),
        })
    }

    /// Supply a replacement value from a handler that may itself fail.
    pub fn then_try_get<F>(self, supply: F) -> Chain<'a, Value<T>, E>
    where
        F: FnOnce(E) -> Result<T, E> + 'a,
    {
        self.complete(Action::Recover { kind: ActionKind::Supply, handler: Box::new(supply) })
    }
}

impl<'a, S: Shape, E: Categorized> Chain<'a, S, E> {
    /// Append a clause covering `category`, consulted only if earlier clauses
    /// did not match.
    pub fn else_if_raises(self, category: E::Category) -> Pending<'a, S, E> {
        Pending { draft: self.draft, categories: vec![category] }
    }

    /// Append a clause covering every category in `categories`.
    pub fn else_if_raises_any<I>(self, categories: I) -> Result<Pending<'a, S, E>, BuildError>
    where
        I: IntoIterator<Item = E::Category>,
    {
        let categories = self.draft.categories(categories)?;
        Ok(Pending { draft: self.draft, categories })
    }

    /// Execute the chain.
    pub fn done(self) -> Result<S::Output, E> {
        self.draft.run()
    }

    /// Execute the chain, running `cleanup` last whatever the outcome.
    pub fn finally_done<F>(self, cleanup: F) -> Result<S::Output, E>
    where
        F: FnOnce() + 'a,
    {
        finish_with_cleanup(self.draft, move || {
            cleanup();
            Ok(())
        })
    }

    /// Like [`finally_done`](Self::finally_done) with a cleanup that may fail.
    /// A cleanup error supersedes any other outcome except a release error.
    pub fn finally_try_done<F>(self, cleanup: F) -> Result<S::Output, E>
    where
        F: FnOnce() -> Result<(), E> + 'a,
    {
        finish_with_cleanup(self.draft, cleanup)
    }
}

impl<'a, E: Categorized> Chain<'a, Unit, E> {
    /// Run `hook` only if the action completed without raising.
    pub fn else_call<F>(self, hook: F) -> Guarded<'a, Unit, E>
    where
        F: FnOnce() + 'a,
    {
        self.else_try_call(move || {
            hook();
            Ok(())
        })
    }

    /// Like [`else_call`](Self::else_call) with a hook that may fail.
    pub fn else_try_call<F>(self, hook: F) -> Guarded<'a, Unit, E>
    where
        F: FnOnce() -> Result<(), E> + 'a,
    {
        let mut draft = self.draft;
        draft.chain.set_success(Box::new(move |_: &()| hook()));
        Guarded { draft }
    }
}

impl<'a, T, E: Categorized> Chain<'a, Value<T>, E> {
    /// Run `hook` with the produced value only if the computation did not raise.
    pub fn else_call<F>(self, hook: F) -> Guarded<'a, Value<T>, E>
    where
        F: FnOnce(&T) + 'a,
    {
        self.else_try_call(move |value: &T| {
            hook(value);
            Ok(())
        })
    }

    /// Like [`else_call`](Self::else_call) with a hook that may fail.
    pub fn else_try_call<F>(self, hook: F) -> Guarded<'a, Value<T>, E>
    where
        F: FnOnce(&T) -> Result<(), E> + 'a,
    {
        let mut draft = self.draft;
        draft.chain.set_success(Box::new(hook));
        Guarded { draft }
    }
}

impl<'a, S: Shape, E: Categorized> Guarded<'a, S, E> {
    /// Execute the chain.
    pub fn done(self) -> Result<S::Output, E> {
        self.draft.run()
    }

    /// Execute the chain, running `cleanup` last whatever the outcome.
    pub fn finally_done<F>(self, cleanup: F) -> Result<S::Output, E>
    where
        F: FnOnce() + 'a,
    {
        finish_with_cleanup(self.draft, move || {
            cleanup();
            Ok(())
        })
    }

    /// Like [`finally_done`](Self::finally_done) with a cleanup that may fail.
    pub fn finally_try_done<F>(self, cleanup: F) -> Result<S::Output, E>
    where
        F: FnOnce() -> Result<(), E> + 'a,
    {
        finish_with_cleanup(self.draft, cleanup)
    }
}

fn finish_with_cleanup<'a, S, E, F>(mut draft: Draft<'a, S, E>, cleanup: F) -> Result<S::Output, E>
where
    S: Shape,
    E: Categorized,
    F: FnOnce() -> Result<(), E> + 'a,
{
    draft.chain.set_cleanup(Box::new(cleanup));
    draft.run()
}
