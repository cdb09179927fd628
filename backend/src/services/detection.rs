//! Detection invocation: one call to the detector, then decoding and
//! alignment checks on its reply.
//!
//! A non-success reply is a first-class [`DetectionOutcome::Failed`] value.
//! Only a success body that breaks the contract (undecodable, or per-index
//! arrays whose length differs from the submitted series) is an error.

use crate::api::{
    BatchDetection, DetectionEndpoint, DetectionOutcome, DetectionRequest, LastPointDetection,
    LastPointOutcome,
};
use crate::detector::{AnomalyDetector, DetectorReply};
use crate::error::{ErrorContext, PipelineError, PipelineResult};

/// Submit the whole series for batch detection.
pub async fn detect_batch(
    detector: &dyn AnomalyDetector,
    request: &DetectionRequest<'_>,
) -> PipelineResult<DetectionOutcome> {
    let reply = detector.submit(DetectionEndpoint::Batch, request).await;
    interpret_batch_reply(reply, request.len())
}

/// Submit the series for latest-point detection.
pub async fn detect_last_point(
    detector: &dyn AnomalyDetector,
    request: &DetectionRequest<'_>,
) -> PipelineResult<LastPointOutcome> {
    let reply = detector.submit(DetectionEndpoint::LastPoint, request).await;
    interpret_last_point_reply(reply)
}

/// Decode a batch reply and verify it is aligned with `expected_len` samples.
pub fn interpret_batch_reply(
    reply: DetectorReply,
    expected_len: usize,
) -> PipelineResult<DetectionOutcome> {
    let body = match reply {
        DetectorReply::Success(body) => body,
        DetectorReply::Failure(failure) => return Ok(DetectionOutcome::Failed(failure)),
    };

    let detection: BatchDetection = serde_json::from_str(&body).map_err(|e| {
        PipelineError::protocol(
            format!("undecodable batch detection body: {}", e),
            ErrorContext::new("detect_batch"),
        )
    })?;

    check_alignment(&detection, expected_len)?;
    Ok(DetectionOutcome::Detected(detection))
}

/// Decode a latest-point reply.
pub fn interpret_last_point_reply(reply: DetectorReply) -> PipelineResult<LastPointOutcome> {
    match reply {
        DetectorReply::Success(body) => serde_json::from_str::<LastPointDetection>(&body)
            .map(LastPointOutcome::Detected)
            .map_err(|e| {
                PipelineError::protocol(
                    format!("undecodable last point detection body: {}", e),
                    ErrorContext::new("detect_last_point"),
                )
            }),
        DetectorReply::Failure(failure) => Ok(LastPointOutcome::Failed(failure)),
    }
}

/// Every per-index array must have exactly one entry per submitted sample.
pub fn check_alignment(detection: &BatchDetection, expected_len: usize) -> PipelineResult<()> {
    let mut lengths = vec![
        ("isAnomaly", detection.is_anomaly.len()),
        ("expectedValues", detection.expected_values.len()),
        ("lowerMargins", detection.lower_margins.len()),
        ("upperMargins", detection.upper_margins.len()),
    ];
    if let Some(ref flags) = detection.is_negative_anomaly {
        lengths.push(("isNegativeAnomaly", flags.len()));
    }
    if let Some(ref flags) = detection.is_positive_anomaly {
        lengths.push(("isPositiveAnomaly", flags.len()));
    }

    match lengths.into_iter().find(|(_, len)| *len != expected_len) {
        Some((field, len)) => Err(PipelineError::protocol(
            format!("{} has {} entries, series has {}", field, len, expected_len),
            ErrorContext::new("detect_batch").with_details(field),
        )),
        None => Ok(()),
    }
}
