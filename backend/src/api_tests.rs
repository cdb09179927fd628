#[cfg(test)]
mod tests {
    use crate::api::{
        AnomalyRow, BatchDetection, DetectionFailure, DetectionRequest, Granularity,
        LastPointDetection, Sample, Series,
    };
    use chrono::{TimeZone, Utc};

    fn sample(minute: u32, value: i64) -> Sample {
        Sample::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(), value)
    }

    #[test]
    fn test_sample_wire_shape() {
        let json = serde_json::to_value(sample(1, 50)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"timestamp": "2024-01-01T00:01:00Z", "value": 50})
        );
    }

    #[test]
    fn test_granularity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Granularity::Minutely).unwrap(),
            "\"minutely\""
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let samples = vec![sample(0, 10), sample(1, 50)];
        let request = DetectionRequest {
            granularity: Granularity::Minutely,
            series: &samples,
        };
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["granularity"], "minutely");
        assert_eq!(json["series"].as_array().unwrap().len(), 2);
        assert_eq!(json["series"][0]["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(json["series"][1]["value"], 50);
    }

    #[test]
    fn test_series_chronological() {
        let sorted = Series::new(Granularity::Minutely, vec![sample(0, 1), sample(0, 2), sample(3, 1)]);
        assert!(sorted.is_chronological());

        let unsorted = Series::new(Granularity::Minutely, vec![sample(2, 1), sample(0, 1)]);
        assert!(!unsorted.is_chronological());

        assert!(Series::empty().is_chronological());
        assert!(Series::empty().is_empty());
    }

    #[test]
    fn test_anomaly_row_wire_shape() {
        let row = AnomalyRow::from(&sample(1, 50));
        let json = serde_json::to_value(row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Timestamp": "2024-01-01T00:01:00Z", "Value": 50})
        );
    }

    #[test]
    fn test_batch_detection_decodes_service_body() {
        let body = r#"{
            "expectedValues": [10.0, 11.0],
            "isAnomaly": [false, true],
            "isNegativeAnomaly": [false, false],
            "isPositiveAnomaly": [false, true],
            "lowerMargins": [1.0, 1.0],
            "upperMargins": [1.0, 1.0],
            "period": 0
        }"#;
        let detection: BatchDetection = serde_json::from_str(body).unwrap();
        assert_eq!(detection.is_anomaly, vec![false, true]);
        assert_eq!(detection.is_positive_anomaly, Some(vec![false, true]));
        assert_eq!(detection.period, 0);
    }

    #[test]
    fn test_batch_detection_directional_flags_optional() {
        let body = r#"{
            "expectedValues": [1.0],
            "isAnomaly": [true],
            "lowerMargins": [0.5],
            "upperMargins": [0.5],
            "period": 12
        }"#;
        let detection: BatchDetection = serde_json::from_str(body).unwrap();
        assert!(detection.is_negative_anomaly.is_none());
        assert!(detection.is_positive_anomaly.is_none());
    }

    #[test]
    fn test_last_point_detection_decodes_service_body() {
        let body = r#"{
            "isAnomaly": true,
            "isNegativeAnomaly": false,
            "isPositiveAnomaly": true,
            "expectedValue": 12.5,
            "lowerMargin": 1.0,
            "upperMargin": 2.0,
            "period": 0,
            "suggestedWindow": 29
        }"#;
        let detection: LastPointDetection = serde_json::from_str(body).unwrap();
        assert!(detection.is_anomaly);
        assert_eq!(detection.suggested_window, Some(29));
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(
            DetectionFailure::new(Some(400), "bad series").to_string(),
            "status 400: bad series"
        );
        assert_eq!(
            DetectionFailure::new(None, "connection refused").to_string(),
            "no response: connection refused"
        );
    }
}
