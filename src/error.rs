//! Error taxonomy for the validation core
//!
//! Generator functions are pure and cannot fail; every recoverable error
//! originates at the persistence or identity boundary and is caught at the
//! transition boundary, never mid-generation. A failed transition leaves the
//! previously persisted stage and scores untouched and can be retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Input fails a precondition. No gateway call is made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A gateway call failed. Retryable; persisted state is unchanged.
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// A transition stalled past its deadline. Retryable.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A session or action id does not resolve. Terminal for that call only.
    #[error("not found: {0}")]
    NotFound(String),

    /// The identity gateway rejected the request.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The same transition is already in flight for this session.
    #[error("transition already in progress: {0}")]
    Conflict(String),
}

impl Error {
    /// Whether the caller may simply retry the same action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Persistence(_) | Error::Timeout(_))
    }
}
