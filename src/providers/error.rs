use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by embedding and vision providers.
pub enum ProviderError {
    /// Transport failure (connect, timeout, body read).
    #[error("request to {endpoint} failed: {message}")]
    RequestFailed { endpoint: String, message: String },

    /// Non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The provider answered, but not in the expected shape.
    #[error("malformed provider response: {reason}")]
    MalformedResponse { reason: String },

    /// The request was not sent because the input cannot be embedded/analyzed.
    #[error("invalid provider input: {reason}")]
    InvalidInput { reason: String },
}

impl ProviderError {
    /// Transport errors, 429 and 5xx are worth retrying; other 4xx are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RequestFailed { .. } => true,
            ProviderError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ProviderError::MalformedResponse { .. } | ProviderError::InvalidInput { .. } => false,
        }
    }
}

/// Result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;
