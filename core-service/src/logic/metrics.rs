//! Metrics Counters - predictions served, drift events, monitor errors
//!
//! Each `Counters` owns its own Prometheus registry, so tests construct fresh
//! instances instead of sharing process-wide state. Counters only go up.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::{Deserialize, Serialize};

/// Recovered failure inside the drift path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorErrorKind {
    ModelFailure,
    LogWrite,
    BaselineUnavailable,
}

impl MonitorErrorKind {
    pub const ALL: [MonitorErrorKind; 3] = [
        MonitorErrorKind::ModelFailure,
        MonitorErrorKind::LogWrite,
        MonitorErrorKind::BaselineUnavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorErrorKind::ModelFailure => "model_failure",
            MonitorErrorKind::LogWrite => "log_write",
            MonitorErrorKind::BaselineUnavailable => "baseline_unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub predictions: u64,
    pub drift_events: u64,
    pub model_failures: u64,
    pub log_write_failures: u64,
    pub baseline_unavailable: u64,
}

#[derive(Clone)]
pub struct Counters {
    registry: Registry,
    predictions_total: IntCounter,
    drift_detected_total: IntCounter,
    monitor_errors_total: IntCounterVec,
}

impl Counters {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let predictions_total = IntCounter::new("predictions_total", "Total predictions served")?;
        registry.register(Box::new(predictions_total.clone()))?;

        let drift_detected_total =
            IntCounter::new("drift_detected_total", "Total requests flagged as drift")?;
        registry.register(Box::new(drift_detected_total.clone()))?;

        let monitor_errors_total = IntCounterVec::new(
            Opts::new(
                "drift_monitor_errors_total",
                "Failures recovered inside the drift monitor",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(monitor_errors_total.clone()))?;

        // Export every kind at zero from the start
        for kind in MonitorErrorKind::ALL {
            monitor_errors_total.with_label_values(&[kind.as_str()]);
        }

        Ok(Self {
            registry,
            predictions_total,
            drift_detected_total,
            monitor_errors_total,
        })
    }

    pub fn record_predictions(&self, by: u64) {
        self.predictions_total.inc_by(by);
    }

    pub fn record_drift(&self, by: u64) {
        self.drift_detected_total.inc_by(by);
    }

    pub fn record_error(&self, kind: MonitorErrorKind) {
        self.monitor_errors_total.with_label_values(&[kind.as_str()]).inc();
    }

    fn errors(&self, kind: MonitorErrorKind) -> u64 {
        self.monitor_errors_total.with_label_values(&[kind.as_str()]).get()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            predictions: self.predictions_total.get(),
            drift_events: self.drift_detected_total.get(),
            model_failures: self.errors(MonitorErrorKind::ModelFailure),
            log_write_failures: self.errors(MonitorErrorKind::LogWrite),
            baseline_unavailable: self.errors(MonitorErrorKind::BaselineUnavailable),
        }
    }

    /// Prometheus text exposition
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for Counters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counters").field("snapshot", &self.snapshot()).finish()
    }
}
