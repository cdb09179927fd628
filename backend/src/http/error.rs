//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
///
/// Only pipeline errors reach the handlers; collaborator failures have
/// already been turned into an empty result.
#[derive(Debug)]
pub struct AppError(pub PipelineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = self.0;
        let details = err.context().to_string();
        let (status, code) = if err.is_bad_input() {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST")
        } else {
            (StatusCode::BAD_GATEWAY, "UPSTREAM_PROTOCOL")
        };

        (status, Json(ApiError::new(code, err.to_string()).with_details(details))).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError(err)
    }
}
