//! Error categories and the covers-relation used to select clauses.
//!
//! The engine never inspects an error beyond asking for its category and
//! whether a declared category covers it. Categories form a partial order
//! supplied by the caller through [`Category::parent`]: category `A` covers
//! category `B` when `B` is `A` or `A` is reachable from `B` by walking parents.
//!
//! Semantics:
//! - `covers` is reflexive: every category covers itself.
//! - `covers` is transitive along the parent chain: a refined category is
//!   covered by every ancestor.
//! - Clause selection is first-match-wins: the first clause with *any*
//!   covering category is chosen, never the most specific one.
//!
//! Example
//! ```rust
//! use raises::{Categorized, Category};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Kind { Storage, DiskFull }
//!
//! impl Category for Kind {
//!     fn parent(&self) -> Option<Self> {
//!         match self {
//!             Kind::DiskFull => Some(Kind::Storage),
//!             Kind::Storage => None,
//!         }
//!     }
//! }
//!
//! assert!(Kind::Storage.covers(&Kind::DiskFull));
//! assert!(Kind::DiskFull.covers(&Kind::DiskFull));
//! assert!(!Kind::DiskFull.covers(&Kind::Storage));
//! ```

use std::fmt;
use std::io;

/// A classification tag for errors, ordered by refinement.
pub trait Category: Clone + PartialEq + fmt::Debug {
    /// The category this one directly refines, if any.
    fn parent(&self) -> Option<Self>;

    /// True iff `other` is `self` or a (transitive) refinement of `self`.
    ///
    /// The parent walk has no depth limit. A cyclic hierarchy is detected
    /// (Brent's algorithm) and reported as "not covered" once the cycle closes.
    fn covers(&self, other: &Self) -> bool {
        let mut current = other.clone();
        let mut checkpoint = other.clone();
        let mut power = 1usize;
        let mut steps = 0usize;
        loop {
            if current == *self {
                return true;
            }
            current = match current.parent() {
                Some(parent) => parent,
                None => return false,
            };
            if current == checkpoint {
                return false;
            }
            steps += 1;
            if steps == power {
                checkpoint = current.clone();
                power = power.saturating_mul(2);
                steps = 0;
            }
        }
    }
}

/// An error value that can report its runtime category.
pub trait Categorized: fmt::Debug {
    type Category: Category;

    fn category(&self) -> Self::Category;
}

/// True iff `category` covers the runtime category of `error`.
pub fn matches<E: Categorized>(category: &E::Category, error: &E) -> bool {
    category.covers(&error.category())
}

/// Index of the first category list containing a category that covers `error`.
///
/// Lists are scanned in order and a later, more specific list is never preferred
/// over an earlier, broader one.
pub fn first_match<'c, E, I>(clauses: I, error: &E) -> Option<usize>
where
    E: Categorized,
    E::Category: 'c,
    I: IntoIterator<Item = &'c [E::Category]>,
{
    clauses
        .into_iter()
        .position(|categories| categories.iter().any(|category| matches(category, error)))
}

/// `io::ErrorKind` is a flat hierarchy: each kind covers only itself.
impl Category for io::ErrorKind {
    fn parent(&self) -> Option<Self> {
        None
    }
}

impl Categorized for io::Error {
    type Category = io::ErrorKind;

    fn category(&self) -> io::ErrorKind {
        self.kind()
    }
}
