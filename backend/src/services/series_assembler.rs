//! Request assembly and pre-submission validation.

use crate::api::{DetectionRequest, Series};

/// Pair the series with its granularity in the request shape the detector
/// expects. Sample order is preserved and nothing is rejected here; an empty
/// series is reported through [`DetectionRequest::is_empty`].
pub fn assemble(series: &Series) -> DetectionRequest<'_> {
    DetectionRequest {
        granularity: series.granularity,
        series: &series.samples,
    }
}

/// A series too short to be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("series has {len} samples, at least {min} are required for detection")]
pub struct ShortSeries {
    pub len: usize,
    pub min: usize,
}

/// Check the detector's minimum-length constraint before any call is made.
pub fn ensure_min_samples(series: &Series, min: usize) -> Result<(), ShortSeries> {
    if series.len() < min {
        return Err(ShortSeries {
            len: series.len(),
            min,
        });
    }
    Ok(())
}
