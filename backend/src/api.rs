//! Public API surface for the anomaly backend.
//!
//! This file consolidates the domain types that flow through the pipeline and
//! the wire shapes exchanged with the detection service. All wire types derive
//! Serialize/Deserialize for JSON serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::time::iso_seconds;

/// Minimum series length accepted by the detection service.
pub const MIN_DETECTION_SAMPLES: usize = 12;

/// One telemetry observation. Serializes as the `{timestamp, value}` element
/// of a detection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(with = "iso_seconds")]
    pub timestamp: DateTime<Utc>,
    pub value: i64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: i64) -> Self {
        Self { timestamp, value }
    }
}

/// Time bucket size the series conforms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Minutely,
}

/// Chronologically ordered samples of a single counter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Series {
    pub granularity: Granularity,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(granularity: Granularity, samples: Vec<Sample>) -> Self {
        Self {
            granularity,
            samples,
        }
    }

    /// A series with no samples, used when telemetry could not be fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether samples are in non-decreasing timestamp order.
    pub fn is_chronological(&self) -> bool {
        self.samples
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }
}

/// Which detection operation to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionEndpoint {
    /// Score every point of the series.
    Batch,
    /// Score only the most recent point.
    LastPoint,
}

impl DetectionEndpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::LastPoint => "last_point",
        }
    }
}

impl std::fmt::Display for DetectionEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body sent to the detection service. Borrows the samples of the
/// series it was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionRequest<'a> {
    pub granularity: Granularity,
    pub series: &'a [Sample],
}

impl DetectionRequest<'_> {
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Empty-series warning flag; the request is still well-formed.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Batch detection body returned by the service on success.
///
/// Every per-index array is aligned with the submitted series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDetection {
    pub is_anomaly: Vec<bool>,
    #[serde(default)]
    pub is_negative_anomaly: Option<Vec<bool>>,
    #[serde(default)]
    pub is_positive_anomaly: Option<Vec<bool>>,
    pub expected_values: Vec<f64>,
    pub lower_margins: Vec<f64>,
    pub upper_margins: Vec<f64>,
    pub period: i64,
}

/// Latest-point detection body returned by the service on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPointDetection {
    pub is_anomaly: bool,
    #[serde(default)]
    pub is_negative_anomaly: Option<bool>,
    #[serde(default)]
    pub is_positive_anomaly: Option<bool>,
    pub expected_value: f64,
    pub lower_margin: f64,
    pub upper_margin: f64,
    pub period: i64,
    #[serde(default)]
    pub suggested_window: Option<i64>,
}

/// Non-success answer from the detection service.
///
/// `status_code` is `None` when the request never produced an HTTP response
/// (connection refused, timeout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionFailure {
    pub status_code: Option<u16>,
    pub message: String,
}

impl DetectionFailure {
    pub fn new(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DetectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "status {}: {}", code, self.message),
            None => write!(f, "no response: {}", self.message),
        }
    }
}

/// Result of a batch detection call.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Detected(BatchDetection),
    Failed(DetectionFailure),
}

/// Result of a latest-point detection call.
#[derive(Debug, Clone, PartialEq)]
pub enum LastPointOutcome {
    Detected(LastPointDetection),
    Failed(DetectionFailure),
}

/// A sample the detector flagged. Serializes with the PascalCase keys of the
/// public output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyRow {
    #[serde(rename = "Timestamp", with = "iso_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Value")]
    pub value: i64,
}

impl From<&Sample> for AnomalyRow {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp,
            value: sample.value,
        }
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
