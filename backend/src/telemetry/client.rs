//! Application Insights REST query client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;

use super::model::TablesResult;
use super::query::TelemetryQuery;
use super::{TelemetryError, TelemetryFailure, TelemetrySource};
use crate::config::{ConfigError, TelemetrySettings};

/// Header carrying the Application Insights API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Telemetry client issuing `GET {base_url}/v1/apps/{app_id}/query`.
#[derive(Debug, Clone)]
pub struct AppInsightsClient {
    client: Client,
    base_url: String,
    app_id: String,
    api_key: String,
}

impl AppInsightsClient {
    /// Create a new client from explicit settings.
    pub fn new(settings: &TelemetrySettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ConfigError::invalid("telemetry", format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            app_id: settings.app_id.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// URL of the query endpoint for the configured application.
    pub fn query_url(&self) -> String {
        format!("{}/v1/apps/{}/query", self.base_url, self.app_id)
    }
}

#[async_trait]
impl TelemetrySource for AppInsightsClient {
    #[tracing::instrument(skip_all, fields(counter = %query.counter_name))]
    async fn fetch(&self, query: &TelemetryQuery) -> Result<TablesResult, TelemetryError> {
        let response = self
            .client
            .get(self.query_url())
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("query", query.render())])
            .send()
            .await
            .map_err(|e| TelemetryFailure::new(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TelemetryFailure::new(Some(status.as_u16()), error_text).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| TelemetryFailure::new(Some(status.as_u16()), e.to_string()))?;
        let tables = serde_json::from_str::<TablesResult>(&body)
            .map_err(|e| TelemetryError::Undecodable(e.to_string()))?;

        tracing::debug!(tables = tables.tables.len(), "Telemetry query succeeded");
        Ok(tables)
    }
}
