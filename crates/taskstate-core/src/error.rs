//! Classified outcomes of store interactions.

use thiserror::Error;

/// Every failure a backend reports falls into exactly one of these classes.
///
/// Callers (the execution engine) pick their retry policy from the class:
/// `Unreachable` leaves the outcome unknown and is safe to retry, the others
/// are definitive answers from the store or from argument validation.
#[derive(Debug, Error)]
pub enum StateError {
    /// Identifier unknown to the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Creation or state transition rejected because of an existing record.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transport-level failure: connection refused, timeout, cancelled at a
    /// deadline, or a response body that could not be decoded.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// A status the component cannot interpret. The raw body is kept for
    /// diagnostics.
    #[error("unexpected response from store (HTTP {status}): {body}")]
    Unexpected { status: u16, body: String },

    /// Caller contract violation, reported before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl StateError {
    /// Returns true if the outcome of the failed call is unknown and the
    /// caller may retry it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
