//! # Domain Errors
//!
//! Typed failure conditions returned by every `Datastore` operation. The
//! store never panics on bad input; it reports one of these instead.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The request was rejected before touching any state.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Unexpected backend failure.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn report_run_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "report run",
            id: id.to_string(),
        }
    }

    pub fn user_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "user",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
