use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::ROOMFIX_STATUS_HEADER;
use crate::repair::IntakeError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unresolvable input: {0}")]
    UnresolvableInput(String),

    #[error("storage error: {0}")]
    StorageError(#[from] StoreError),
}

impl From<IntakeError> for GatewayError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::UnresolvableInput { reason } => GatewayError::UnresolvableInput(reason),
            IntakeError::Store(e) => GatewayError::StorageError(e),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::UnresolvableInput(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unresolvable_input")
            }
            GatewayError::StorageError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, roomfix_status) = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ROOMFIX_STATUS_HEADER,
            HeaderValue::from_static(roomfix_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
