//! Conversion of generic telemetry rows into a chronologically ordered series.
//!
//! Each row is `[timestamp_literal, decimal_literal, ...]`; extra cells are
//! ignored. Values are truncated toward zero to the integral counter value the
//! detector is fed with.

use crate::api::{Granularity, Sample, Series};
use crate::error::{PipelineError, PipelineResult};
use crate::models::time::parse_instant;
use crate::telemetry::TablesResult;

/// 2^63, the first magnitude an `i64` cannot hold on the positive side.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Parse a decimal literal and truncate it toward zero.
///
/// Rejects anything that is not a finite number (`NaN`, `inf`, empty) and
/// finite values whose integral part does not fit an `i64`.
pub fn parse_counter_value(literal: &str) -> Option<i64> {
    let value: f64 = literal.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if !(-I64_BOUND..I64_BOUND).contains(&truncated) {
        return None;
    }
    Some(truncated as i64)
}

/// Parse one row into a [`Sample`]. `index` is only used for error context.
pub fn parse_row(row: &[String], index: usize) -> PipelineResult<Sample> {
    let timestamp_literal = row.first().map(String::as_str).unwrap_or_default();
    let timestamp = parse_instant(timestamp_literal)
        .ok_or_else(|| PipelineError::malformed_timestamp(timestamp_literal, index))?;

    let value_literal = row.get(1).map(String::as_str).unwrap_or_default();
    let value = parse_counter_value(value_literal)
        .ok_or_else(|| PipelineError::malformed_value(value_literal, index))?;

    Ok(Sample::new(timestamp, value))
}

/// Parse all rows and order them ascending by timestamp.
///
/// The sort is stable: rows sharing a timestamp keep their original order.
/// An empty row set yields an empty series; the caller decides whether that
/// is enough to submit.
pub fn parse_rows(rows: &[Vec<String>], granularity: Granularity) -> PipelineResult<Series> {
    let mut samples = rows
        .iter()
        .enumerate()
        .map(|(index, row)| parse_row(row, index))
        .collect::<PipelineResult<Vec<_>>>()?;

    samples.sort_by_key(|sample| sample.timestamp);

    Ok(Series::new(granularity, samples))
}

/// Parse the first table of a telemetry response.
pub fn parse_table(tables: TablesResult, granularity: Granularity) -> PipelineResult<Series> {
    parse_rows(&tables.into_primary_rows(), granularity)
}

#[cfg(test)]
#[path = "table_parser_tests.rs"]
mod table_parser_tests;
