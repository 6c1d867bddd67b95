//! HTTP gateway (Axum) for matching, profile vectors, and repair intake.
//!
//! This module is primarily used by the `roomfix` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{match_handler, repair_analyze_handler, user_vector_handler};
pub use state::HandlerState;

/// Response header carrying a short machine-readable error kind.
pub const ROOMFIX_STATUS_HEADER: &str = "x-roomfix-status";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/matching/match", post(match_handler))
        .route("/api/users/vector", post(user_vector_handler))
        .route("/api/repair/analyze", post(repair_analyze_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}
