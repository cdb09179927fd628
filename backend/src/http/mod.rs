//! HTTP server module for the anomaly backend.
//!
//! This module provides an axum-based HTTP server that exposes the anomaly
//! pipeline as a REST API. It reuses the service layer and DTOs from the core
//! library.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - JSON serialization                                     │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/pipeline.rs)                     │
//! │  - Parsing, assembly, detection, mapping                  │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Collaborators (telemetry/, detector/)                    │
//! │  - TelemetrySource / AnomalyDetector                      │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
