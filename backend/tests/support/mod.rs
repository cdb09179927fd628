#![allow(dead_code)]

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use counter_anomalies::api::{DetectionEndpoint, DetectionFailure, DetectionRequest};
use counter_anomalies::detector::{AnomalyDetector, DetectorReply};
use counter_anomalies::telemetry::{
    TablesResult, TelemetryError, TelemetryFailure, TelemetryQuery, TelemetrySource,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =========================================================
// Telemetry rows
// =========================================================

/// One row per value, one minute apart starting at 2024-01-01T00:00:00Z.
pub fn minute_rows(values: &[i64]) -> Vec<Vec<String>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let ts = start + Duration::minutes(i as i64);
            vec![ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true), v.to_string()]
        })
        .collect()
}

pub fn string_rows(raw: &[(&str, &str)]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|(t, v)| vec![t.to_string(), v.to_string()])
        .collect()
}

// =========================================================
// Collaborator doubles
// =========================================================

/// Telemetry source answering every query with the same result.
pub struct StaticTelemetry {
    result: Result<TablesResult, TelemetryError>,
    calls: AtomicUsize,
}

impl StaticTelemetry {
    pub fn rows(rows: Vec<Vec<String>>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(TablesResult::from_rows(rows)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(status_code: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(TelemetryFailure::new(Some(status_code), message).into()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Success answer whose body could not be decoded.
    pub fn undecodable(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(TelemetryError::Undecodable(message.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetrySource for StaticTelemetry {
    async fn fetch(&self, _query: &TelemetryQuery) -> Result<TablesResult, TelemetryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Detector answering every call with the same reply and recording what it got.
pub struct ScriptedDetector {
    reply: DetectorReply,
    calls: AtomicUsize,
    endpoints: Mutex<Vec<DetectionEndpoint>>,
    last_body: Mutex<Option<serde_json::Value>>,
}

impl ScriptedDetector {
    pub fn replying(reply: DetectorReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            endpoints: Mutex::new(Vec::new()),
            last_body: Mutex::new(None),
        })
    }

    /// Successful batch reply flagging the given indices.
    pub fn batch_flags(flags: &[bool]) -> Arc<Self> {
        Self::replying(DetectorReply::Success(batch_body(flags)))
    }

    pub fn last_point(is_anomaly: bool) -> Arc<Self> {
        let body = serde_json::json!({
            "isAnomaly": is_anomaly,
            "isNegativeAnomaly": false,
            "isPositiveAnomaly": is_anomaly,
            "expectedValue": 100.0,
            "lowerMargin": 5.0,
            "upperMargin": 5.0,
            "period": 0,
            "suggestedWindow": 29
        });
        Self::replying(DetectorReply::Success(body.to_string()))
    }

    pub fn failing(status_code: u16, message: &str) -> Arc<Self> {
        Self::replying(DetectorReply::Failure(DetectionFailure::new(
            Some(status_code),
            message,
        )))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn endpoints(&self) -> Vec<DetectionEndpoint> {
        self.endpoints.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.last_body.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnomalyDetector for ScriptedDetector {
    async fn submit(&self, endpoint: DetectionEndpoint, request: &DetectionRequest<'_>) -> DetectorReply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.endpoints.lock().unwrap().push(endpoint);
        *self.last_body.lock().unwrap() = Some(serde_json::to_value(request).unwrap());
        self.reply.clone()
    }
}

pub fn batch_body(flags: &[bool]) -> String {
    let n = flags.len();
    serde_json::json!({
        "expectedValues": vec![100.0; n],
        "isAnomaly": flags,
        "isNegativeAnomaly": vec![false; n],
        "isPositiveAnomaly": flags,
        "lowerMargins": vec![5.0; n],
        "upperMargins": vec![5.0; n],
        "period": 0
    })
    .to_string()
}

// =========================================================
// Log capture
// =========================================================

/// A captured tracing event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: String,
}

/// Layer recording every event it sees.
#[derive(Clone, Default)]
pub struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }
}

#[derive(Default)]
struct FieldRecorder {
    message: String,
    fields: Vec<String>,
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for EventCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: recorder.message,
            fields: recorder.fields.join(" "),
        });
    }
}
