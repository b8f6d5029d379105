//! Error types for collaborator calls
//!
//! Session providers and resource stores report failures through
//! [`CoreError`]. The engine never lets these escape a security check; they
//! are collapsed into denials at the assembler and ownership boundaries.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Error raised by a session provider or resource store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Resource store lookup failed (connection, query, decode)
    #[error("Store error: {0}")]
    Store(String),

    /// Session provider could not report the current identity
    #[error("Session error: {0}")]
    Session(String),

    /// A record the caller expected to exist is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input/state
    #[error("Invalid: {0}")]
    Invalid(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the error came from the resource store
    pub fn is_store_error(&self) -> bool {
        matches!(self, CoreError::Store(_) | CoreError::NotFound(_))
    }
}
