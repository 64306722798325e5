//! One link of a policy chain: a set of categories and the action to take.

use crate::category::Categorized;
use std::fmt;

/// What a selected clause does with the raised error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionKind {
    /// Handle the error for its side effect; the chain completes with `()`.
    Consume,
    /// Handle the error and supply a replacement value.
    Supply,
    /// Raise a new error in place of the original.
    Transform,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Consume => write!(f, "consume"),
            ActionKind::Supply => write!(f, "supply"),
            ActionKind::Transform => write!(f, "transform"),
        }
    }
}

/// Recovery handlers return `Err` when they themselves fail.
pub(crate) type Recovery<'a, T, E> = Box<dyn FnOnce(E) -> Result<T, E> + 'a>;

pub(crate) enum Action<'a, T, E> {
    Recover { kind: ActionKind, handler: Recovery<'a, T, E> },
    Transform(Box<dyn FnOnce(E) -> E + 'a>),
}

impl<'a, T, E> Action<'a, T, E> {
    pub(crate) fn kind(&self) -> ActionKind {
        match self {
            Action::Recover { kind, .. } => *kind,
            Action::Transform(_) => ActionKind::Transform,
        }
    }
}

pub(crate) struct Clause<'a, T, E: Categorized> {
    categories: Vec<E::Category>,
    action: Action<'a, T, E>,
}

impl<'a, T, E: Categorized> Clause<'a, T, E> {
    /// Callers validate that `categories` is non-empty.
    pub(crate) fn new(categories: Vec<E::Category>, action: Action<'a, T, E>) -> Self {
        debug_assert!(!categories.is_empty(), "clause without categories");
        Self { categories, action }
    }

    pub(crate) fn categories(&self) -> &[E::Category] {
        &self.categories
    }

    pub(crate) fn into_action(self) -> Action<'a, T, E> {
        self.action
    }
}

impl<'a, T, E: Categorized> fmt::Debug for Clause<'a, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clause")
            .field("categories", &self.categories)
            .field("action", &self.action.kind())
            .finish()
    }
}
