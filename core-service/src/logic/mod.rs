//! Logic Module - Drift detection & audit logging engines
//!
//! - `features/` - feature order (layout) and the request vector
//! - `baseline/` - reference dataset loading and statistics
//! - `rules.rs` - hard domain constraints
//! - `model/` - anomaly detector (isolation forest) and ONNX regressor
//! - `audit/` - append-only drift/audit CSV logs
//! - `metrics.rs` - Prometheus counters
//! - `drift/` - the per-request evaluator tying it together
//! - `config.rs` - environment configuration

pub mod audit;
pub mod baseline;
pub mod config;
pub mod drift;
pub mod features;
pub mod metrics;
pub mod model;
pub mod rules;
