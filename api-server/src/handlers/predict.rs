//! Prediction handlers
//!
//! Each item is counted, handed to the drift monitor on the blocking pool
//! (not awaited), then priced by the regressor.

use axum::{extract::State, Json};

use revenue_drift_core::FeatureVector;

use crate::models::{BatchPredictionResponse, PredictionResponse};
use crate::{AppError, AppResult, AppState};

pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<FeatureVector>,
) -> AppResult<Json<PredictionResponse>> {
    let mut values = run(&state, vec![request]).await?;
    let value = values
        .pop()
        .ok_or_else(|| AppError::PredictionFailed("empty model output".to_string()))?;

    Ok(Json(PredictionResponse::new(value)))
}

pub async fn predict_batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<FeatureVector>>,
) -> AppResult<Json<BatchPredictionResponse>> {
    if requests.is_empty() {
        return Err(AppError::BadRequest("Empty batch".to_string()));
    }

    let values = run(&state, requests).await?;
    Ok(Json(BatchPredictionResponse {
        predictions: values.into_iter().map(PredictionResponse::new).collect(),
    }))
}

async fn run(state: &AppState, requests: Vec<FeatureVector>) -> AppResult<Vec<f64>> {
    // Drift log and regressor see the same input
    let items: Vec<FeatureVector> = requests.iter().map(FeatureVector::sanitized).collect();

    state.counters.record_predictions(items.len() as u64);

    let monitor = state.monitor.clone();
    let batch = items.clone();
    tokio::task::spawn_blocking(move || monitor.evaluate_batch(&batch));

    let regressor = state.regressor.clone().ok_or(AppError::ModelUnavailable)?;
    let values = tokio::task::spawn_blocking(move || regressor.predict_batch(&items)).await??;

    Ok(values)
}
