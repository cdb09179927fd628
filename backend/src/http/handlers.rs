//! HTTP handlers for the REST API.
//!
//! Each handler runs one pipeline invocation. Collaborator failures already
//! degrade to an empty array inside the pipeline, so handlers only map
//! malformed telemetry and protocol violations to error responses.

use axum::{extract::State, Json};

use super::dto::{AnomalyRowsResponse, HealthResponse};
use super::error::AppError;
use super::state::AppState;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check() -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
    }))
}

// =============================================================================
// Anomaly Endpoints
// =============================================================================

/// GET|POST /v1/anomalies
///
/// Batch detection over the most recent counter series.
pub async fn detect_anomalies(State(state): State<AppState>) -> HandlerResult<AnomalyRowsResponse> {
    let rows = state.pipeline.run_batch().await?;
    Ok(Json(rows))
}

/// GET /v1/anomalies/latest
///
/// Detection of the most recent point only; returns zero or one row.
pub async fn detect_latest_anomaly(
    State(state): State<AppState>,
) -> HandlerResult<AnomalyRowsResponse> {
    let rows = state.pipeline.run_last_point().await?;
    Ok(Json(rows))
}
