//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::AnomalyPipeline;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline run once per request
    pub pipeline: Arc<AnomalyPipeline>,
}

impl AppState {
    /// Create a new application state with the given pipeline.
    pub fn new(pipeline: AnomalyPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
