#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # raises
//!
//! Declarative error-handling policies for synchronous Rust code: protect an
//! operation, declare ordered recovery clauses keyed by error category, add
//! success and cleanup hooks, and let the engine guarantee resource release.
//!
//! ## Features
//!
//! - **Ordered clauses** matched first-come, first-served against a category hierarchy
//! - **Three actions**: consume, supply a replacement value, or transform and rethrow
//! - **Success and cleanup hooks** with well-defined ordering
//! - **Resource scopes** released in reverse acquisition order on every path
//! - **Typestate builder**: illegal call sequences do not compile
//! - **Telemetry** via pluggable event sinks and `tracing` logs
//!
//! ## Quick Start
//!
//! ```rust
//! use raises::{attempt, Categorized, Category};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Kind { Io, NotFound, Denied }
//!
//! impl Category for Kind {
//!     fn parent(&self) -> Option<Self> {
//!         match self {
//!             Kind::NotFound | Kind::Denied => Some(Kind::Io),
//!             Kind::Io => None,
//!         }
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct StoreError(Kind);
//!
//! impl Categorized for StoreError {
//!     type Category = Kind;
//!     fn category(&self) -> Kind { self.0 }
//! }
//!
//! let outcome = attempt(|| Err(StoreError(Kind::NotFound)))
//!     .if_raises(Kind::Denied)
//!     .then_throw(|e| e)
//!     .else_if_raises(Kind::Io)
//!     .then_call(|e| eprintln!("ignoring {:?}", e))
//!     .finally_done(|| eprintln!("done"));
//! assert!(outcome.is_ok());
//! ```

pub mod category;
pub mod chain;
pub mod clause;
mod engine;
pub mod entry;
pub mod error;
pub mod prelude;
pub mod resource;
pub mod telemetry;

// Re-exports
pub use category::{first_match, matches, Categorized, Category};
pub use chain::{Chain, Guarded, Pending, Protected, Shape, Unit, Value};
pub use clause::ActionKind;
pub use entry::{attempt, attempt_with, compute, compute_with};
pub use error::BuildError;
pub use resource::{Deferred, Resource, ResourceScope};
pub use telemetry::{ChainEvent, EventSink, LogSink, MemorySink, NullSink};
