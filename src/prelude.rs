//! Convenient re-exports for common types.
pub use crate::{
    category::{Categorized, Category},
    chain::{Chain, Guarded, Pending, Protected, Shape, Unit, Value},
    clause::ActionKind,
    entry::{attempt, attempt_with, compute, compute_with},
    error::BuildError,
    resource::{Deferred, Resource, ResourceScope},
    telemetry::{ChainEvent, EventSink, LogSink, MemorySink, NullSink},
};
