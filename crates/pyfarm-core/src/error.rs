//! Shared error kinds used across the scheduler crates.
//!
//! Each crate boundary (store, scheduler, dispatch, daemon) defines its own
//! `thiserror` enum for the failures specific to that layer, but the kinds
//! that show up at more than one boundary live here so callers can match on
//! one vocabulary regardless of which crate raised it.

use thiserror::Error;

/// Error kinds shared by every layer of the scheduler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Reference to an entity that does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A unique-key constraint would be violated by this write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input failed validation before reaching the core model.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_renders_kind_and_id() {
        let err = CoreError::not_found("Agent", 7);
        assert_eq!(err.to_string(), "Agent 7 not found");
    }
}
