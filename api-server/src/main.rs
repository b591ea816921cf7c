//! Revenue Prediction API
//!
//! Serves revenue predictions and monitors every request for drift.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      REVENUE API (Axum)                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /predict ─┬─► Counters (predictions_total)             │
//! │                 ├─► DriftMonitor (blocking pool, not awaited)│
//! │                 │     rules ─► isolation forest ─► CSV logs  │
//! │                 └─► ONNX regressor ─► {"total_revenue": ..}  │
//! │                                                              │
//! │  startup: baseline CSV ─► fit forest (background)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;


use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revenue_drift_core::{Counters, DriftMonitor, MonitorConfig, Regressor};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env before the filter so RUST_LOG can live there)
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "revenue_api=debug,revenue_drift_core=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();

    tracing::info!("Revenue API v{} starting...", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Baseline: {:?}, drift log: {:?}, audit mode: {}",
        config.monitor.baseline_path,
        config.monitor.drift_log_path,
        config.monitor.audit_mode
    );

    let counters = Arc::new(
        Counters::new().map_err(|e| anyhow::anyhow!("metrics registry: {}", e))?,
    );
    let monitor = Arc::new(DriftMonitor::from_config(&config.monitor, counters.clone()));

    // Requests are served in rule-only mode until the forest is fitted
    spawn_fit(monitor.clone(), config.monitor.clone());

    let regressor = match Regressor::load(&config.model_path(), &config.monitor.layout) {
        Ok(regressor) => Some(Arc::new(regressor)),
        Err(e) => {
            tracing::warn!("Model not loaded: {}", e);
            None
        }
    };

    let state = AppState {
        monitor,
        counters,
        regressor,
    };

    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Fit the anomaly model off the request path
fn spawn_fit(monitor: Arc<DriftMonitor>, config: MonitorConfig) {
    tokio::task::spawn_blocking(move || {
        let mode = monitor.fit_from_baseline(&config);
        tracing::info!("Drift monitor ready ({})", mode);
    });
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<DriftMonitor>,
    pub counters: Arc<Counters>,
    pub regressor: Option<Arc<Regressor>>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let prediction_routes = Router::new()
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/batch", post(handlers::predict::predict_batch));

    let monitoring_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/metrics", get(handlers::metrics::export))
        .route("/drift/status", get(handlers::drift::status))
        .route("/drift/recent", get(handlers::drift::recent));

    // Combine all routes
    Router::new()
        .merge(prediction_routes)
        .merge(monitoring_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
