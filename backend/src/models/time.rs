//! Timestamp handling for telemetry cells and wire payloads.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Naive layouts accepted when a literal carries no offset. Interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp literal into a UTC instant.
///
/// Accepts RFC 3339 (any offset, normalized to UTC) and the offset-less
/// layouts in [`NAIVE_FORMATS`]. Surrounding whitespace is ignored.
pub fn parse_instant(literal: &str) -> Option<DateTime<Utc>> {
    let literal = literal.trim();
    if literal.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(literal) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(literal, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render an instant in the ISO-8601 form used on every wire surface
/// (`YYYY-MM-DDTHH:MM:SSZ`).
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serde adapter for `DateTime<Utc>` fields using [`format_instant`] /
/// [`parse_instant`].
pub mod iso_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_instant(instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let literal = String::deserialize(deserializer)?;
        super::parse_instant(&literal)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", literal)))
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod time_tests;
