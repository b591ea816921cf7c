//! drift-check - replay a CSV of requests through the drift monitor

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use revenue_drift_core::logic::baseline::read_feature_rows;
use revenue_drift_core::{Counters, DriftMonitor, MonitorConfig, MonitorMode};

/// Evaluate every row of a request CSV offline, writing the same drift and
/// audit logs the API would.
#[derive(Debug, Parser)]
#[command(name = "drift-check")]
#[command(version, about = "Offline drift evaluation of request rows")]
struct Cli {
    /// Request rows (header with the layout's feature columns).
    #[arg(long)]
    input: PathBuf,
    /// Baseline CSV, overrides DATA_DIR/RAW_DATA_FILE.
    #[arg(long)]
    baseline: Option<PathBuf>,
    /// Drift log path.
    #[arg(long)]
    drift_log: Option<PathBuf>,
    /// Audit log path.
    #[arg(long)]
    audit_log: Option<PathBuf>,
    /// Append every evaluated row to the audit log.
    #[arg(long)]
    audit: bool,
}

#[derive(Debug, Serialize)]
struct CheckSummary {
    evaluated: usize,
    drift: usize,
    by_reason: BTreeMap<String, usize>,
    mode: MonitorMode,
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = MonitorConfig::from_env();
    if let Some(path) = cli.baseline {
        config.baseline_path = path;
    }
    if let Some(path) = cli.drift_log {
        config.drift_log_path = path;
    }
    if let Some(path) = cli.audit_log {
        config.audit_log_path = path;
    }
    config.audit_mode |= cli.audit;

    let rows = read_feature_rows(&cli.input, &config.layout).map_err(io::Error::other)?;
    log::info!("Loaded {} request rows from {:?}", rows.len(), cli.input);

    let counters = Arc::new(Counters::new().map_err(|e| io::Error::other(e.to_string()))?);
    let monitor = DriftMonitor::from_config(&config, counters);
    let mode = monitor.fit_from_baseline(&config);

    let mut summary = CheckSummary {
        evaluated: 0,
        drift: 0,
        by_reason: BTreeMap::new(),
        mode,
    };

    for verdict in monitor.evaluate_batch(&rows) {
        summary.evaluated += 1;
        if let Some(reason) = verdict.reason() {
            summary.drift += 1;
            *summary.by_reason.entry(reason.code()).or_insert(0) += 1;
        }
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
