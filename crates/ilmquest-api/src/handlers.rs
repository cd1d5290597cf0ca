//! Route handler functions for all API endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ilmquest_core::{ChatRequest, SegmentedResponse};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Response for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub model: String,
}

/// POST /api/chat - answer a question with follow-up suggestions.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<SegmentedResponse>, ApiError> {
    let Json(body) = payload?;
    let question = match body.question {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Err(ApiError::BadRequest("Question is required".to_string())),
    };

    let reply = state.chat.answer(&question, body.history).await?;
    Ok(Json(reply))
}

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        model: state.chat.model().to_string(),
    })
}
