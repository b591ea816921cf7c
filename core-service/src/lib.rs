//! Revenue drift core
//!
//! Decides per request whether a feature vector is in-distribution, logs the
//! ones that are not, and keeps the counters the API exposes.

pub mod constants;
pub mod logic;

pub use logic::audit::{DriftLogger, LogDestination, LogRecord, LogWriteError};
pub use logic::baseline::{load_baseline, BaselineDataset, BaselineError, BaselineSummary};
pub use logic::config::{ConfigError, MonitorConfig};
pub use logic::drift::{DriftMonitor, DriftReason, DriftVerdict, MonitorMode, MonitorStatus, RecentDrift};
pub use logic::features::{Feature, FeatureLayout, FeatureVector, LayoutError, LayoutInfo};
pub use logic::metrics::{CounterSnapshot, Counters, MonitorErrorKind};
pub use logic::model::{
    AnomalyDetector, AnomalyLabel, AnomalyPrediction, InferenceError, IsolationForest,
    IsolationForestConfig, ModelError, Regressor,
};
pub use logic::rules::{RuleEngine, RuleThresholds, RuleViolation};
