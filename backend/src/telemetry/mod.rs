//! Telemetry collaborator: fetches one counter as a generic result table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Pipeline (services/pipeline.rs)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │ TelemetryQuery
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  TelemetrySource trait - Abstract Interface             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │  AppInsightsClient (reqwest, REST query API) │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! The pipeline depends only on [`TablesResult`]; any source able to produce
//! that shape can be plugged in.

pub mod client;
pub mod model;
pub mod query;

pub use client::AppInsightsClient;
pub use model::{Column, Table, TablesResult};
pub use query::TelemetryQuery;

use async_trait::async_trait;

/// Non-success answer from the telemetry store.
///
/// `status_code` is `None` when no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("telemetry request failed (status {status_code:?}): {message}")]
pub struct TelemetryFailure {
    pub status_code: Option<u16>,
    pub message: String,
}

impl TelemetryFailure {
    pub fn new(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

/// Why a telemetry fetch produced no result table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelemetryError {
    /// Non-success status, or no response at all.
    #[error(transparent)]
    Failed(#[from] TelemetryFailure),

    /// A success response whose body is not `{ tables: [ { rows } ] }`.
    #[error("telemetry body is not a result table: {0}")]
    Undecodable(String),
}

/// Source of counter telemetry.
///
/// Implementations perform exactly one request per call and keep no state
/// between calls.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across handlers.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Run `query` and return the raw result tables.
    async fn fetch(&self, query: &TelemetryQuery) -> Result<TablesResult, TelemetryError>;
}
