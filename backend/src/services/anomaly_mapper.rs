//! Re-alignment of detector flags onto the submitted samples.
//!
//! Index `i` of every per-index array refers to `series.samples[i]`. The
//! alignment itself is checked when the reply is decoded, so the mapper
//! never fails.

use crate::api::{AnomalyRow, DetectionOutcome, LastPointOutcome, Series};

/// Project every flagged sample, in series (chronological) order.
///
/// A failed outcome maps to no rows; reporting the failure is the caller's job.
pub fn map_anomalies(series: &Series, outcome: &DetectionOutcome) -> Vec<AnomalyRow> {
    match outcome {
        DetectionOutcome::Detected(detection) => series
            .samples
            .iter()
            .zip(&detection.is_anomaly)
            .filter(|(_, flagged)| **flagged)
            .map(|(sample, _)| AnomalyRow::from(sample))
            .collect(),
        DetectionOutcome::Failed(_) => Vec::new(),
    }
}

/// The last sample when the detector flags it, otherwise nothing.
pub fn map_last_point(series: &Series, outcome: &LastPointOutcome) -> Vec<AnomalyRow> {
    match outcome {
        LastPointOutcome::Detected(detection) if detection.is_anomaly => series
            .samples
            .last()
            .map(AnomalyRow::from)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BatchDetection, DetectionFailure, Granularity, LastPointDetection, Sample};
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn series_of(values: &[i64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Series::new(
            Granularity::Minutely,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Sample::new(start + Duration::minutes(i as i64), *v))
                .collect(),
        )
    }

    fn detected(flags: Vec<bool>) -> DetectionOutcome {
        let n = flags.len();
        DetectionOutcome::Detected(BatchDetection {
            is_anomaly: flags,
            is_negative_anomaly: None,
            is_positive_anomaly: None,
            expected_values: vec![0.0; n],
            lower_margins: vec![0.0; n],
            upper_margins: vec![0.0; n],
            period: 0,
        })
    }

    fn last_point(is_anomaly: bool) -> LastPointOutcome {
        LastPointOutcome::Detected(LastPointDetection {
            is_anomaly,
            is_negative_anomaly: None,
            is_positive_anomaly: None,
            expected_value: 0.0,
            lower_margin: 0.0,
            upper_margin: 0.0,
            period: 0,
            suggested_window: None,
        })
    }

    #[test]
    fn test_maps_flagged_sample() {
        let series = series_of(&[10, 50]);
        let rows = map_anomalies(&series, &detected(vec![false, true]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 50);
        assert_eq!(
            serde_json::to_value(&rows).unwrap(),
            serde_json::json!([{"Timestamp": "2024-01-01T00:01:00Z", "Value": 50}])
        );
    }

    #[test]
    fn test_no_flags_no_rows() {
        let series = series_of(&[1, 2, 3]);
        assert!(map_anomalies(&series, &detected(vec![false; 3])).is_empty());
    }

    #[test]
    fn test_failed_outcome_maps_to_empty() {
        let series = series_of(&[1, 2, 3]);
        let outcome = DetectionOutcome::Failed(DetectionFailure::new(Some(400), "bad"));
        assert!(map_anomalies(&series, &outcome).is_empty());
    }

    #[test]
    fn test_last_point_flagged() {
        let series = series_of(&[1, 2, 99]);
        let rows = map_last_point(&series, &last_point(true));
        assert_eq!(rows, vec![AnomalyRow::from(&series.samples[2])]);
    }

    #[test]
    fn test_last_point_not_flagged_or_failed() {
        let series = series_of(&[1, 2, 3]);
        assert!(map_last_point(&series, &last_point(false)).is_empty());
        let failed = LastPointOutcome::Failed(DetectionFailure::new(None, "timeout"));
        assert!(map_last_point(&series, &failed).is_empty());
        assert!(map_last_point(&Series::empty(), &last_point(true)).is_empty());
    }

    proptest! {
        #[test]
        fn prop_exactly_flagged_samples_in_order(
            cells in prop::collection::vec((0i64..10_000, any::<bool>()), 0..80)
        ) {
            let values: Vec<i64> = cells.iter().map(|(v, _)| *v).collect();
            let flags: Vec<bool> = cells.iter().map(|(_, f)| *f).collect();
            let series = series_of(&values);
            let outcome = detected(flags.clone());

            let rows = map_anomalies(&series, &outcome);

            let expected: Vec<AnomalyRow> = (0..flags.len())
                .filter(|&i| flags[i])
                .map(|i| AnomalyRow::from(&series.samples[i]))
                .collect();
            prop_assert_eq!(&rows, &expected);
            prop_assert_eq!(rows.len(), flags.iter().filter(|f| **f).count());
            prop_assert!(rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

            // Same inputs, same result.
            prop_assert_eq!(map_anomalies(&series, &outcome), rows);
        }
    }
}
