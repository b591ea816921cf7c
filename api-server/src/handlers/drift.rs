//! Drift monitor inspection handlers

use axum::{
    extract::{Query, State},
    Json,
};

use revenue_drift_core::logic::audit::MAX_RECENT;
use revenue_drift_core::RecentDrift;

use crate::models::{DriftStatusResponse, RecentQuery};
use crate::AppState;

const DEFAULT_RECENT_LIMIT: usize = 20;

pub async fn status(State(state): State<AppState>) -> Json<DriftStatusResponse> {
    Json(DriftStatusResponse {
        monitor: state.monitor.status(),
        regressor: state.regressor.as_ref().map(|r| r.status()),
    })
}

pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<RecentDrift> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT).min(MAX_RECENT);
    Json(state.monitor.recent(limit))
}
