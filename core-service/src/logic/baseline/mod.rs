//! Baseline Module - reference data for the anomaly model
//!
//! # Architecture
//! - `types.rs`: `BaselineDataset`, `BaselineSummary`
//! - `loader.rs`: CSV reading (quote-aware, empty cells read as 0)
//! - `validate.rs`: `BaselineError`, header checks
//!
//! # Failure Strategy
//! A missing or malformed baseline is never fatal: the caller logs a warning
//! and the drift monitor runs in rule-only mode.

pub mod types;
pub mod loader;
pub mod validate;
#[cfg(test)]
mod tests;

pub use types::{BaselineDataset, BaselineSummary, FeatureStats};
pub use loader::{load_baseline, read_feature_rows};
pub use validate::BaselineError;
