//! Errors raised by the entity store.

use pyfarm_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        CoreError::not_found(kind, id).into()
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict(message.into()).into()
    }
}
