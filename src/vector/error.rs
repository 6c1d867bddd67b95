use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors returned by vector comparisons.
pub enum VectorError {
    /// The two vectors have different lengths.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length of the query (left-hand) vector.
        expected: usize,
        /// Length of the compared vector.
        actual: usize,
    },
}

/// Result alias for vector operations.
pub type VectorResult<T> = Result<T, VectorError>;
