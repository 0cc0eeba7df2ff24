/// Core error taxonomy
///
/// Every function in [`crate::ops`] returns [`CoreResult`]. The API crate
/// maps each variant to an HTTP status; inside the core, an error anywhere
/// in a mutation drops the transaction, so no partial activity or
/// notification rows survive a failed operation.

use thiserror::Error;

use crate::access::resolver::AccessError;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Unified error type for core operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// The actor lacks the capability the operation requires
    #[error("Permission denied: {0}")]
    PermissionDenied(AccessError),

    /// The operation is impossible in the target's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The input failed a domain rule
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AccessError> for CoreError {
    fn from(err: AccessError) -> Self {
        match err {
            // A database failure during a capability check is not a denial
            AccessError::DatabaseError(e) => CoreError::Database(e),
            other => CoreError::PermissionDenied(other),
        }
    }
}
