//! Telemetry for policy chain executions.
//!
//! Every execution reports what happened through an [`EventSink`]. Sinks can
//! log, aggregate, or forward events; the default is [`NullSink`].
//!
//! # Event Types
//!
//! - **Success path**: `Succeeded`
//! - **Failure path**: `Handled`, `Transformed`, `Unmatched`
//! - **Hooks**: `HookFailed`
//! - **Resources**: `Released`
//! - **Precedence**: `Superseded` (a pending error was replaced by a later one)
//!
//! ```rust
//! use raises::telemetry::{ChainEvent, EventSink, MemorySink};
//! use raises::ActionKind;
//!
//! let sink = MemorySink::new();
//! sink.emit(ChainEvent::Handled { clause: 0, action: ActionKind::Consume });
//! assert_eq!(sink.len(), 1);
//! assert_eq!(sink.events()[0].to_string(), "Handled(clause=0, action=consume)");
//! ```

use crate::clause::ActionKind;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Events emitted while executing a policy chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ChainEvent {
    /// The protected operation completed without raising.
    Succeeded,
    /// A clause recovered from the raised error.
    Handled {
        /// Zero-based position of the selected clause.
        clause: usize,
        action: ActionKind,
    },
    /// A clause replaced the raised error with a new one.
    Transformed { clause: usize },
    /// No clause covered the raised error; it propagates unchanged.
    Unmatched,
    /// A caller-supplied hook or handler returned an error.
    HookFailed { hook: Hook },
    /// The resource scope was drained.
    Released {
        /// Resources released.
        released: usize,
        /// Releases that returned an error.
        failed: usize,
    },
    /// A pending error was discarded in favour of a later failure.
    Superseded { stage: Stage },
}

/// Caller-supplied callbacks that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Hook {
    /// A clause's recovery handler.
    Handler,
    /// The success hook installed by `else_call`.
    Success,
    /// The cleanup hook installed by `finally_done`.
    Cleanup,
}

/// Stages whose failure supersedes a pending error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stage {
    Cleanup,
    Release,
}

impl fmt::Display for ChainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainEvent::Succeeded => write!(f, "Succeeded"),
            ChainEvent::Handled { clause, action } => {
                write!(f, "Handled(clause={}, action={})", clause, action)
            }
            ChainEvent::Transformed { clause } => write!(f, "Transformed(clause={})", clause),
            ChainEvent::Unmatched => write!(f, "Unmatched"),
            ChainEvent::HookFailed { hook } => write!(f, "HookFailed({})", hook),
            ChainEvent::Released { released, failed } => {
                write!(f, "Released({}, failed={})", released, failed)
            }
            ChainEvent::Superseded { stage } => write!(f, "Superseded(by={})", stage),
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Handler => write!(f, "handler"),
            Hook::Success => write!(f, "success"),
            Hook::Cleanup => write!(f, "cleanup"),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Cleanup => write!(f, "cleanup"),
            Stage::Release => write!(f, "release"),
        }
    }
}

#[cfg(feature = "telemetry-json")]
impl ChainEvent {
    /// Flat JSON rendering with a `kind` discriminator.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            ChainEvent::Succeeded => json!({ "kind": "succeeded" }),
            ChainEvent::Handled { clause, action } => {
                json!({ "kind": "handled", "clause": clause, "action": action.to_string() })
            }
            ChainEvent::Transformed { clause } => json!({ "kind": "transformed", "clause": clause }),
            ChainEvent::Unmatched => json!({ "kind": "unmatched" }),
            ChainEvent::HookFailed { hook } => {
                json!({ "kind": "hook_failed", "hook": hook.to_string() })
            }
            ChainEvent::Released { released, failed } => {
                json!({ "kind": "released", "released": released, "failed": failed })
            }
            ChainEvent::Superseded { stage } => {
                json!({ "kind": "superseded", "stage": stage.to_string() })
            }
        }
    }
}

/// Consumer of chain events.
///
/// Emission is synchronous and must not fail: a sink that cannot deliver an
/// event drops it.
///
/// # Implementing a Custom Sink
///
/// ```rust
/// use raises::telemetry::{ChainEvent, EventSink};
///
/// #[derive(Debug)]
/// struct Stdout;
///
/// impl EventSink for Stdout {
///     fn emit(&self, event: ChainEvent) {
///         println!("chain event: {}", event);
///     }
/// }
/// ```
pub trait EventSink: fmt::Debug {
    fn emit(&self, event: ChainEvent);
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn emit(&self, event: ChainEvent) {
        (**self).emit(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&self, event: ChainEvent) {
        (**self).emit(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: ChainEvent) {
        (**self).emit(event)
    }
}

/// A sink that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ChainEvent) {}
}

/// A sink that logs events using the `tracing` crate at INFO level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: ChainEvent) {
        tracing::info!(event = %event, "chain_event");
    }
}

/// A sink that stores events in memory.
///
/// Bounded: when full, the oldest event is evicted and counted. Clones share
/// storage, so a test can keep one handle and give another to a chain.
#[derive(Clone, Debug)]
pub struct MemorySink {
    events: Arc<Mutex<VecDeque<ChainEvent>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemorySink {
    /// Creates a bounded memory sink (default cap: 10,000).
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    fn guard(&self) -> MutexGuard<'_, VecDeque<ChainEvent>> {
        // Events are plain data; a panic mid-push cannot leave them inconsistent.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a snapshot of all events received so far.
    pub fn events(&self) -> Vec<ChainEvent> {
        self.guard().iter().copied().collect()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of evicted events.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: ChainEvent) {
        let mut guard = self.guard();
        if guard.len() >= self.capacity {
            guard.pop_front();
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        guard.push_back(event);
    }
}
