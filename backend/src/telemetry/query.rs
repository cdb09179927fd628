//! Telemetry query template.
//!
//! The query averages one performance counter per time bin so that the series
//! has the granularity the detector expects, keeps the most recent `take`
//! bins, and returns them oldest first. The detector needs at least 12 bins,
//! so `lookback_minutes` and `take` must leave room for that.

use serde::{Deserialize, Serialize};

fn default_counter_name() -> String {
    "Private Bytes".to_string()
}

fn default_role() -> String {
    "CD".to_string()
}

fn default_bin_minutes() -> u32 {
    1
}

fn default_take() -> u32 {
    100
}

/// Parameters of the counter query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryQuery {
    /// Performance counter name (`performanceCounters.name`)
    #[serde(default = "default_counter_name")]
    pub counter_name: String,
    /// Cloud role the counter is reported by (`customDimensions.Role`)
    #[serde(default = "default_role")]
    pub role: String,
    /// Only consider counters newer than this many minutes; no limit when unset
    #[serde(default)]
    pub lookback_minutes: Option<u32>,
    /// Bin width in minutes
    #[serde(default = "default_bin_minutes")]
    pub bin_minutes: u32,
    /// Number of most recent bins to keep
    #[serde(default = "default_take")]
    pub take: u32,
}

impl Default for TelemetryQuery {
    fn default() -> Self {
        Self {
            counter_name: default_counter_name(),
            role: default_role(),
            lookback_minutes: None,
            bin_minutes: default_bin_minutes(),
            take: default_take(),
        }
    }
}

impl TelemetryQuery {
    pub fn with_lookback_minutes(mut self, minutes: u32) -> Self {
        self.lookback_minutes = Some(minutes);
        self
    }

    /// Render the query text.
    pub fn render(&self) -> String {
        let time_limit = match self.lookback_minutes {
            Some(minutes) => format!("| where timestamp > now(-{}m) ", minutes),
            None => String::new(),
        };

        format!(
            "performanceCounters {time_limit}\
             | where tostring(customDimensions.Role) == '{role}' \
             | where name == '{counter}' \
             | summarize avgValue=avg(value) by bin(timestamp, {bin}m) \
             | project timestamp, tostring(avgValue) \
             | order by timestamp desc \
             | take {take} \
             | order by timestamp asc",
            time_limit = time_limit,
            role = escape_literal(&self.role),
            counter = escape_literal(&self.counter_name),
            bin = self.bin_minutes.max(1),
            take = self.take,
        )
    }
}

/// Escape a value for a single-quoted Kusto string literal.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
