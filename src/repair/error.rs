use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
/// Request-level failures of a repair intake.
pub enum IntakeError {
    /// The referenced image could not be read or was empty.
    #[error("unresolvable input: {reason}")]
    UnresolvableInput { reason: String },

    /// The report store failed.
    #[error("report store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for intake operations.
pub type IntakeResult<T> = Result<T, IntakeError>;
