//! Prometheus scrape endpoint

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{AppError, AppResult, AppState};

pub async fn export(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let body = state
        .counters
        .export()
        .map_err(|e| AppError::Internal(format!("metrics export: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    ))
}
