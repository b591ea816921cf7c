//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use revenue_drift_core::MonitorMode;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    drift_mode: MonitorMode,
    version: &'static str,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive",
        model_loaded: state.regressor.is_some(),
        drift_mode: state.monitor.mode(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
