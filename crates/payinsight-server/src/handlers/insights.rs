//! Insight handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState};

/// Request body for a question
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Answer to a question
#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub insight_text: String,
    /// Chart spec serialized to a JSON string (`"{}"` when there is no chart)
    pub chart_json: String,
    pub query_used: String,
}

/// POST /get-insight - Answer a free-text question about the store
pub async fn get_insight(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<InsightResponse>, AppError> {
    debug!(query = %request.query, "Insight requested");

    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || engine.answer(&request.query))
        .await
        .map_err(|_| AppError::internal("Insight task failed"))??;

    Ok(Json(InsightResponse {
        chart_json: serde_json::to_string(&result.chart_spec)?,
        insight_text: result.insight_text,
        query_used: result.query_used,
    }))
}
