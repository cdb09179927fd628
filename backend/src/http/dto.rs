//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

pub use crate::api::AnomalyRow;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of every anomaly endpoint: `[{"Timestamp": .., "Value": ..}, ..]`.
pub type AnomalyRowsResponse = Vec<AnomalyRow>;
