//! Anomaly HTTP Server Binary
//!
//! This is the main entry point for the anomaly REST API server.
//! It loads configuration, builds the pipeline, sets up the HTTP router, and
//! starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Configuration from anomalies.toml in a default location
//! cargo run --bin anomaly-server
//!
//! # Configuration from the environment
//! TELEMETRY_APP_ID=... TELEMETRY_API_KEY=... \
//! DETECTOR_ENDPOINT=https://<resource>.cognitiveservices.azure.com \
//! DETECTOR_SUBSCRIPTION_KEY=... \
//!   cargo run --bin anomaly-server
//! ```
//!
//! # Environment Variables
//!
//! - `ANOMALY_CONFIG`: explicit path to a TOML configuration file
//! - `RUST_LOG`: Log level (default: info)
//! - see [`counter_anomalies::config::AppConfig::from_env`] for the rest

use std::env;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use counter_anomalies::config::AppConfig;
use counter_anomalies::http::{create_router, AppState};
use counter_anomalies::services::AnomalyPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting anomaly HTTP server");

    let config = AppConfig::load()?;
    let pipeline = AnomalyPipeline::from_config(&config)?;
    info!(
        counter = %pipeline.query().counter_name,
        min_samples = pipeline.min_samples(),
        "Pipeline configured"
    );

    let app = create_router(AppState::new(pipeline));

    let addr = config.server.socket_addr()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
