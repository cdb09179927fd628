//! Service configuration.
//!
//! Configuration is loaded once at startup, either from a TOML file or from
//! environment variables, and then passed explicitly to the telemetry and
//! detection clients. Nothing below reads ambient state after construction.

use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::MIN_DETECTION_SAMPLES;
use crate::telemetry::TelemetryQuery;

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ANOMALY_CONFIG";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(String),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No anomalies.toml found in standard locations")]
    NotFound,
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_telemetry_base_url() -> String {
    "https://api.applicationinsights.io".to_string()
}

fn default_batch_path() -> String {
    "anomalydetector/v1.0/timeseries/entire/detect".to_string()
}

fn default_last_point_path() -> String {
    "anomalydetector/v1.0/timeseries/last/detect".to_string()
}

fn default_min_samples() -> usize {
    MIN_DETECTION_SAMPLES
}

fn default_timeout_secs() -> u64 {
    30
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Listener address. `host` must be an IPv4 or IPv6 literal.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::invalid("host", e.to_string()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Telemetry store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default = "default_telemetry_base_url")]
    pub base_url: String,
    pub app_id: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Detection service connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorSettings {
    /// Base URL of the detection resource
    pub endpoint: String,
    pub subscription_key: String,
    #[serde(default = "default_batch_path")]
    pub batch_path: String,
    #[serde(default = "default_last_point_path")]
    pub last_point_path: String,
    /// Series shorter than this are not submitted
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            subscription_key: String::new(),
            batch_path: default_batch_path(),
            last_point_path: default_last_point_path(),
            min_samples: default_min_samples(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub telemetry: TelemetrySettings,
    pub detector: DetectorSettings,
    #[serde(default)]
    pub query: TelemetryQuery,
}

fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

/// Value of `key`, treating an unset or blank variable as absent.
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn optional_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    optional(key)
        .map(|raw| {
            raw.parse()
                .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string()))
        })
        .transpose()
}

impl AppConfig {
    /// Create a configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `TELEMETRY_APP_ID` (required): Application Insights application id
    /// - `TELEMETRY_API_KEY` (required): Application Insights API key
    /// - `TELEMETRY_BASE_URL` (optional, default: `https://api.applicationinsights.io`)
    /// - `TELEMETRY_LOOKBACK_MINUTES` (optional): only query counters this recent
    /// - `DETECTOR_ENDPOINT` (required): detection resource base URL
    /// - `DETECTOR_SUBSCRIPTION_KEY` (required): detection subscription key
    /// - `DETECTOR_BATCH_PATH` / `DETECTOR_LAST_POINT_PATH` (optional)
    /// - `DETECTOR_MIN_SAMPLES` (optional, default: 12)
    /// - `HTTP_TIMEOUT_SECS` (optional, default: 30): per-request timeout for both clients
    /// - `HOST` (optional, default: 0.0.0.0), `PORT` (optional, default: 8080)
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse.
    /// Blank optional variables fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = optional_parsed("HTTP_TIMEOUT_SECS")?.unwrap_or_else(default_timeout_secs);

        let telemetry = TelemetrySettings {
            base_url: optional("TELEMETRY_BASE_URL").unwrap_or_else(default_telemetry_base_url),
            app_id: required("TELEMETRY_APP_ID")?,
            api_key: required("TELEMETRY_API_KEY")?,
            timeout_secs,
        };

        let defaults = DetectorSettings::default();
        let detector = DetectorSettings {
            endpoint: required("DETECTOR_ENDPOINT")?,
            subscription_key: required("DETECTOR_SUBSCRIPTION_KEY")?,
            batch_path: optional("DETECTOR_BATCH_PATH").unwrap_or(defaults.batch_path),
            last_point_path: optional("DETECTOR_LAST_POINT_PATH").unwrap_or(defaults.last_point_path),
            min_samples: optional_parsed("DETECTOR_MIN_SAMPLES")?.unwrap_or(defaults.min_samples),
            timeout_secs,
        };

        let query = TelemetryQuery {
            lookback_minutes: optional_parsed("TELEMETRY_LOOKBACK_MINUTES")?,
            ..Default::default()
        };

        let server = ServerSettings {
            host: optional("HOST").unwrap_or_else(default_host),
            port: optional_parsed("PORT")?.unwrap_or_else(default_port),
        };

        Ok(Self {
            server,
            telemetry,
            detector,
            query,
        })
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `anomalies.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("anomalies.toml"),
            PathBuf::from("backend/anomalies.toml"),
            PathBuf::from("../anomalies.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Resolve configuration the way the server binary does: an explicit file
    /// named by `ANOMALY_CONFIG`, else a file in a default location, else the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Self::from_file(path);
        }

        match Self::from_default_location() {
            Err(ConfigError::NotFound) => Self::from_env(),
            other => other,
        }
    }
}
