//! HTTP client for the anomaly detection service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;

use super::{AnomalyDetector, DetectorReply};
use crate::api::{DetectionEndpoint, DetectionFailure, DetectionRequest};
use crate::config::{ConfigError, DetectorSettings};

/// Header carrying the detection service subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Detector issuing `POST {endpoint}/{path}` with a JSON series body.
#[derive(Debug, Clone)]
pub struct HttpAnomalyDetector {
    client: Client,
    endpoint: String,
    subscription_key: String,
    batch_path: String,
    last_point_path: String,
}

impl HttpAnomalyDetector {
    /// Create a new detector from explicit settings.
    pub fn new(settings: &DetectorSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ConfigError::invalid("detector", format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            subscription_key: settings.subscription_key.clone(),
            batch_path: settings.batch_path.trim_start_matches('/').to_string(),
            last_point_path: settings.last_point_path.trim_start_matches('/').to_string(),
        })
    }

    /// Full URL of the operation selected by `endpoint`.
    pub fn url_for(&self, endpoint: DetectionEndpoint) -> String {
        let path = match endpoint {
            DetectionEndpoint::Batch => &self.batch_path,
            DetectionEndpoint::LastPoint => &self.last_point_path,
        };
        format!("{}/{}", self.endpoint, path)
    }
}

#[async_trait]
impl AnomalyDetector for HttpAnomalyDetector {
    #[tracing::instrument(skip_all, fields(endpoint = %endpoint, samples = request.len()))]
    async fn submit(&self, endpoint: DetectionEndpoint, request: &DetectionRequest<'_>) -> DetectorReply {
        let response = match self
            .client
            .post(self.url_for(endpoint))
            .header(ACCEPT, "application/json")
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return DetectorReply::Failure(DetectionFailure::new(None, e.to_string())),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return DetectorReply::Failure(DetectionFailure::new(
                    Some(status.as_u16()),
                    format!("Failed to read response body: {}", e),
                ))
            }
        };

        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "Detection call succeeded");
            DetectorReply::Success(body)
        } else {
            DetectorReply::Failure(DetectionFailure::new(Some(status.as_u16()), body))
        }
    }
}
