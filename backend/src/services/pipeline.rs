//! Anomaly pipeline orchestration.
//!
//! Runs the steps of one invocation strictly in sequence:
//! fetch telemetry, parse rows, check length, assemble, detect, map.
//! Collaborator failures degrade to an empty result and are logged once;
//! only malformed rows and protocol violations are returned as errors.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::{
    AnomalyRow, DetectionEndpoint, DetectionOutcome, Granularity, LastPointOutcome, Series,
    MIN_DETECTION_SAMPLES,
};
use crate::config::{AppConfig, ConfigError};
use crate::detector::{AnomalyDetector, HttpAnomalyDetector};
use crate::error::{ErrorContext, PipelineError, PipelineResult};
use crate::parsing::table_parser;
use crate::services::{anomaly_mapper, detection, series_assembler};
use crate::telemetry::{AppInsightsClient, TelemetryError, TelemetryQuery, TelemetrySource};

/// One counter, one detector, one query.
#[derive(Clone)]
pub struct AnomalyPipeline {
    telemetry: Arc<dyn TelemetrySource>,
    detector: Arc<dyn AnomalyDetector>,
    query: TelemetryQuery,
    min_samples: usize,
}

impl AnomalyPipeline {
    /// Create a pipeline with the default query and the detector's 12-sample minimum.
    pub fn new(telemetry: Arc<dyn TelemetrySource>, detector: Arc<dyn AnomalyDetector>) -> Self {
        Self {
            telemetry,
            detector,
            query: TelemetryQuery::default(),
            min_samples: MIN_DETECTION_SAMPLES,
        }
    }

    /// Build the HTTP-backed pipeline described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let telemetry = Arc::new(AppInsightsClient::new(&config.telemetry)?);
        let detector = Arc::new(HttpAnomalyDetector::new(&config.detector)?);

        Ok(Self::new(telemetry, detector)
            .with_query(config.query.clone())
            .with_min_samples(config.detector.min_samples))
    }

    pub fn with_query(mut self, query: TelemetryQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    pub fn query(&self) -> &TelemetryQuery {
        &self.query
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Fetch and parse the counter series.
    ///
    /// A failed telemetry request is logged and yields an empty series. A
    /// success body that is not a result table is a protocol violation.
    pub async fn load_series(&self) -> PipelineResult<Series> {
        let tables = match self.telemetry.fetch(&self.query).await {
            Ok(tables) => tables,
            Err(TelemetryError::Failed(failure)) => {
                error!(
                    status_code = ?failure.status_code,
                    message = %failure.message,
                    "Error when getting telemetry data"
                );
                return Ok(Series::empty());
            }
            Err(TelemetryError::Undecodable(message)) => {
                return Err(PipelineError::protocol(
                    message,
                    ErrorContext::new("fetch_telemetry").with_details("tables"),
                ));
            }
        };

        table_parser::parse_table(tables, Granularity::Minutely)
    }

    /// Run one invocation against `endpoint` and return the anomalous rows.
    #[tracing::instrument(
        name = "anomaly_pipeline",
        skip_all,
        fields(invocation_id = %Uuid::new_v4(), endpoint = %endpoint)
    )]
    pub async fn run(&self, endpoint: DetectionEndpoint) -> PipelineResult<Vec<AnomalyRow>> {
        let series = self.load_series().await?;

        if let Err(short) = series_assembler::ensure_min_samples(&series, self.min_samples) {
            warn!(samples = short.len, min_samples = short.min, "Series too short, skipping detection");
            return Ok(Vec::new());
        }

        let request = series_assembler::assemble(&series);
        info!(samples = request.len(), "Submitting series for detection");

        let rows = match endpoint {
            DetectionEndpoint::Batch => {
                let outcome = detection::detect_batch(self.detector.as_ref(), &request).await?;
                if let DetectionOutcome::Failed(ref failure) = outcome {
                    error!(
                        status_code = ?failure.status_code,
                        message = %failure.message,
                        "Anomaly detection call failed"
                    );
                }
                anomaly_mapper::map_anomalies(&series, &outcome)
            }
            DetectionEndpoint::LastPoint => {
                let outcome = detection::detect_last_point(self.detector.as_ref(), &request).await?;
                if let LastPointOutcome::Failed(ref failure) = outcome {
                    error!(
                        status_code = ?failure.status_code,
                        message = %failure.message,
                        "Anomaly detection call failed"
                    );
                }
                anomaly_mapper::map_last_point(&series, &outcome)
            }
        };

        info!(anomalies = rows.len(), "Detection finished");
        Ok(rows)
    }

    /// Batch detection over the whole series.
    pub async fn run_batch(&self) -> PipelineResult<Vec<AnomalyRow>> {
        self.run(DetectionEndpoint::Batch).await
    }

    /// Detection of the most recent point only.
    pub async fn run_last_point(&self) -> PipelineResult<Vec<AnomalyRow>> {
        self.run(DetectionEndpoint::LastPoint).await
    }
}
