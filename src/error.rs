//! Error types for building policy chains.
//!
//! Execution itself never introduces an error type of its own: whatever the
//! protected operation, a handler, a hook or a resource returns travels through
//! the caller's `E` unchanged.

use thiserror::Error;

/// Errors produced while building a policy chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A clause was declared with an empty category list.
    #[error("clause {clause} must declare at least one error category")]
    EmptyCategories {
        /// Zero-based position of the offending clause in the chain.
        clause: usize,
    },
}

impl BuildError {
    /// Position of the clause that failed validation.
    pub fn clause(&self) -> usize {
        match self {
            BuildError::EmptyCategories { clause } => *clause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_categories_display() {
        let err = BuildError::EmptyCategories { clause: 2 };
        let msg = err.to_string();
        assert!(msg.contains("clause 2"));
        assert!(msg.contains("at least one"));
        assert_eq!(err.clause(), 2);
    }
}
