//! Drift Module - per-request drift evaluation
//!
//! Cách hoạt động:
//! 1. Sanitize the vector (non-finite → 0)
//! 2. Rule engine; a violation short-circuits the model
//! 3. Anomaly model, if fitted
//! 4. Flagged vectors go to the drift log and the drift counter
//!
//! Nothing here returns an error to the caller: failures are logged, counted
//! in `drift_monitor_errors_total` and treated as "not drift".

mod monitor;
mod types;

#[cfg(test)]
mod tests;

pub use monitor::DriftMonitor;
pub use types::{DriftReason, DriftVerdict, MonitorMode, MonitorStatus, RecentDrift};
