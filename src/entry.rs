//! Entry points: wrap a protected operation and hand back a chain builder.

use crate::category::Categorized;
use crate::chain::{Protected, Unit, Value};
use crate::resource::ResourceScope;

/// Protect an action that produces no value.
pub fn attempt<'a, E, F>(action: F) -> Protected<'a, Unit, E>
where
    E: Categorized,
    F: FnOnce() -> Result<(), E> + 'a,
{
    attempt_with(ResourceScope::new(), action)
}

/// Protect a computation producing a `T`.
pub fn compute<'a, T, E, F>(computation: F) -> Protected<'a, Value<T>, E>
where
    E: Categorized,
    F: FnOnce() -> Result<T, E> + 'a,
{
    compute_with(ResourceScope::new(), computation)
}

/// Protect an action and release `resources` (newest first) once it is over.
pub fn attempt_with<'a, E, F>(resources: ResourceScope<'a, E>, action: F) -> Protected<'a, Unit, E>
where
    E: Categorized,
    F: FnOnce() -> Result<(), E> + 'a,
{
    Protected::new(Box::new(action), resources)
}

/// Protect a computation and release `resources` (newest first) once it is over.
pub fn compute_with<'a, T, E, F>(
    resources: ResourceScope<'a, E>,
    computation: F,
) -> Protected<'a, Value<T>, E>
where
    E: Categorized,
    F: FnOnce() -> Result<T, E> + 'a,
{
    Protected::new(Box::new(computation), resources)
}
