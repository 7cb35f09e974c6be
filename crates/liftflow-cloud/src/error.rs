//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    /// The resource did not reach the target status before the deadline.
    #[error("Timeout: {resource} did not reach {target} within {waited_secs}s (last status: {last})")]
    Timeout {
        resource: String,
        target: String,
        last: String,
        waited_secs: u64,
    },

    /// A status outside both the pending and target sets was observed.
    #[error("Unexpected status for {resource}: {status} (expected {expected})")]
    UnexpectedStatus {
        resource: String,
        status: String,
        expected: String,
    },

    /// The remote service returned a result set that breaks the
    /// one-record-per-ID rule.
    #[error("Inconsistent remote state: expected exactly 1 record for {resource}, found {found}")]
    Inconsistent { resource: String, found: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether the error is a terminal status mismatch reported by a waiter.
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, CloudError::UnexpectedStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
