//! Detection collaborator: transport to the anomaly detection service.
//!
//! The transport never interprets the body it receives and never raises:
//! a non-success answer is returned as [`DetectorReply::Failure`]. Decoding
//! and alignment checks live in [`crate::services::detection`].

pub mod client;

pub use client::HttpAnomalyDetector;

use async_trait::async_trait;

use crate::api::{DetectionEndpoint, DetectionFailure, DetectionRequest};

/// Raw answer of one detection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorReply {
    /// Transport-level success; carries the undecoded response body.
    Success(String),
    /// Non-success status or no response at all.
    Failure(DetectionFailure),
}

/// Anomaly detection service.
///
/// Each call performs exactly one request: no retry, no backoff, no state
/// kept between calls.
#[async_trait]
pub trait AnomalyDetector: Send + Sync {
    /// Submit `request` to the operation selected by `endpoint`.
    async fn submit(&self, endpoint: DetectionEndpoint, request: &DetectionRequest<'_>) -> DetectorReply;
}
