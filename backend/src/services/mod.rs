//! Service layer for the anomaly pipeline.
//!
//! This module contains the steps between the telemetry source and the HTTP
//! layer. Each step is a pure function except the orchestrating
//! [`AnomalyPipeline`], which owns the collaborators.

pub mod anomaly_mapper;
pub mod detection;
pub mod pipeline;
pub mod series_assembler;

pub use anomaly_mapper::{map_anomalies, map_last_point};
pub use detection::{detect_batch, detect_last_point};
pub use pipeline::AnomalyPipeline;
pub use series_assembler::{assemble, ensure_min_samples, ShortSeries};
