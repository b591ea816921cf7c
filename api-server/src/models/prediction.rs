//! Prediction and drift endpoint payloads

use serde::{Deserialize, Serialize};

use revenue_drift_core::logic::model::RegressorStatus;
use revenue_drift_core::MonitorStatus;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub total_revenue: f64,
}

impl PredictionResponse {
    /// Revenue rounded to cents
    pub fn new(value: f64) -> Self {
        Self {
            total_revenue: (value * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<PredictionResponse>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DriftStatusResponse {
    pub monitor: MonitorStatus,
    pub regressor: Option<RegressorStatus>,
}
