//! Store error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Document store error
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the operation (security rules)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::PermissionDenied(_) => ErrorCode::StoreWriteFailed,
            StoreError::Unavailable(_) => ErrorCode::StoreUnavailable,
            StoreError::Serialization(_) => ErrorCode::InternalError,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::with_message(err.code(), err.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
