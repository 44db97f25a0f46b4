//! Error type shared by every core component.

use thiserror::Error;

/// Core errors.
///
/// `Clone` so a single failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Selection changed while resolving (resolved revision {resolved}, current {current})")]
    StaleSelection { resolved: u64, current: u64 },
}

impl CoreError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::NetworkFailure(_) | CoreError::Storage(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
