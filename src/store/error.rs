use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors returned by the vector, report, and image stores.
pub enum StoreError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage root path is missing/unavailable.
    #[error("storage path unavailable: {path}")]
    StorageUnavailable {
        /// Path that was unavailable.
        path: PathBuf,
    },

    /// A vector file's length is not a whole number of `f32`s.
    #[error("corrupt vector file {path}: {len} bytes")]
    CorruptVector {
        /// File path.
        path: PathBuf,
        /// File length in bytes.
        len: usize,
    },

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    TaskFailed(String),

    /// A line of the report log could not be parsed.
    #[error("corrupt report log {path} at line {line}: {reason}")]
    CorruptLog {
        /// Log path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Parser message.
        reason: String,
    },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
