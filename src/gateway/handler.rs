use axum::{Json, extract::State};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::payload::{
    MatchRequest, RepairAnalyzeRequest, RepairAnalyzeResponse, VectorGenerationRequest,
    VectorGenerationResponse,
};
use crate::gateway::state::HandlerState;
use crate::matching::{RankedResult, generate_profile_vectors, resolve_match_vectors};

fn parse_request<T: DeserializeOwned>(request: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

#[instrument(skip(state, request), fields(candidates = tracing::field::Empty))]
pub async fn match_handler(
    State(state): State<HandlerState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Json<Vec<RankedResult>>, GatewayError> {
    let MatchRequest {
        my_profile,
        preferences,
        candidates,
    } = parse_request(request)?;
    tracing::Span::current().record("candidates", candidates.len());

    if candidates.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let (my_profile, candidates) =
        resolve_match_vectors(state.vectors.clone(), my_profile, candidates).await?;

    let results = state.ranker.rank(&my_profile, &preferences, &candidates);
    debug!(seeker_id = my_profile.id, results = results.len(), "Match request served");
    Ok(Json(results))
}

#[instrument(skip(state, request), fields(user_id = tracing::field::Empty))]
pub async fn user_vector_handler(
    State(state): State<HandlerState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Json<VectorGenerationResponse>, GatewayError> {
    let request: VectorGenerationRequest = parse_request(request)?;
    tracing::Span::current().record("user_id", request.user_id);

    let details = generate_profile_vectors(
        state.embedder.as_ref(),
        state.vectors.clone(),
        request.user_id,
        request.self_description.as_deref(),
        request.roommate_description.as_deref(),
    )
    .await?;

    info!(
        user_id = request.user_id,
        self_vector = details.self_vector.is_saved(),
        criteria_vector = details.criteria_vector.is_saved(),
        "Profile vectors generated"
    );

    Ok(Json(VectorGenerationResponse {
        status: "ok",
        message: format!("Vectors processed for user {}", request.user_id),
        details,
    }))
}

#[instrument(skip(state, request))]
pub async fn repair_analyze_handler(
    State(state): State<HandlerState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Json<RepairAnalyzeResponse>, GatewayError> {
    let request: RepairAnalyzeRequest = parse_request(request)?;
    let intake = request.into_intake_request()?;

    let outcome = state.intake.intake(intake).await?;
    Ok(Json(outcome.into()))
}
