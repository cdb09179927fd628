//! # Counter Anomalies Backend
//!
//! Performance-counter anomaly detection service.
//!
//! This crate fetches a single performance-counter time series from a
//! telemetry store, submits it to a statistical anomaly-detection service,
//! and returns the points the service flagged as anomalous. The backend
//! exposes a REST API via Axum.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: domain types and detection wire shapes
//! - [`parsing`]: conversion of telemetry tables into ordered series
//! - [`services`]: request assembly, detection invocation, anomaly mapping, orchestration
//! - [`telemetry`]: telemetry source trait and the Application Insights client
//! - [`detector`]: detection transport trait and the HTTP client
//! - [`config`]: explicit configuration loaded from TOML or the environment
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Flow
//!
//! ```text
//! TelemetrySource ─▶ table_parser ─▶ series_assembler ─▶ detection ─▶ anomaly_mapper
//! ```
//!
//! Each invocation builds its own series and outcome; no state is shared
//! between invocations.

pub mod api;
pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod parsing;
pub mod services;
pub mod telemetry;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{ErrorContext, PipelineError, PipelineResult};
