//! Drift monitor end-to-end behaviour

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::logic::audit::DriftLogger;
use crate::logic::config::MonitorConfig;
use crate::logic::features::{FeatureLayout, FeatureVector};
use crate::logic::metrics::Counters;
use crate::logic::model::{AnomalyDetector, AnomalyLabel, AnomalyPrediction, ModelError};
use crate::logic::rules::{RuleThresholds, RuleViolation};

// ============================================================================
// FIXTURES
// ============================================================================

fn vector(price: f64, discounted_price: f64, discount_percent: f64) -> FeatureVector {
    FeatureVector {
        discount_percent,
        discounted_price,
        price,
        quantity_sold: 5,
        rating: 4.2,
        review_count: 30,
    }
}

/// Scenario 1: passes every rule, sits in the middle of the baseline
fn typical() -> FeatureVector {
    vector(100.0, 80.0, 20.0)
}

/// Passes every rule but lies far outside the baseline
fn outlier() -> FeatureVector {
    FeatureVector {
        discount_percent: 2.0,
        discounted_price: 49_000.0,
        price: 50_000.0,
        quantity_sold: 480,
        rating: 1.1,
        review_count: 90_000,
    }
}

/// Baseline CSV of plausible sales rows around `typical()`
fn write_baseline(dir: &Path, rows: usize) -> PathBuf {
    let mut rng = StdRng::seed_from_u64(7);
    let mut csv = String::from(
        "product_name,discount_percent,discounted_price,price,quantity_sold,rating,review_count,total_revenue\n",
    );

    for i in 0..rows {
        let price: f64 = rng.gen_range(60.0..140.0);
        let discount: f64 = rng.gen_range(5.0..35.0);
        let discounted = price * (1.0 - discount / 100.0);
        let quantity: i64 = rng.gen_range(1..10);
        let rating: f64 = rng.gen_range(3.5..5.0);
        let reviews: i64 = rng.gen_range(10..50);
        writeln!(
            csv,
            "\"Item {i}, blue\",{discount:.2},{discounted:.2},{price:.2},{quantity},{rating:.1},{reviews},{:.2}",
            discounted * quantity as f64
        )
        .unwrap();
    }

    let path = dir.join("raw.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn config(dir: &Path) -> MonitorConfig {
    MonitorConfig {
        baseline_path: dir.join("raw.csv"),
        drift_log_path: dir.join("logs").join("drift_log.csv"),
        audit_log_path: dir.join("logs").join("audit_log.csv"),
        ..MonitorConfig::default()
    }
}

fn monitor(config: &MonitorConfig) -> DriftMonitor {
    DriftMonitor::from_config(config, Arc::new(Counters::new().unwrap()))
}

fn fitted(dir: &Path) -> (DriftMonitor, MonitorConfig) {
    write_baseline(dir, 600);
    let config = config(dir);
    let monitor = monitor(&config);
    assert_eq!(monitor.fit_from_baseline(&config), MonitorMode::Full);
    (monitor, config)
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).map(|s| s.lines().count()).unwrap_or(0)
}

struct FailingDetector;

impl AnomalyDetector for FailingDetector {
    fn predict(&self, _values: &[f64]) -> Result<AnomalyPrediction, ModelError> {
        Err(ModelError::NonFinite)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[derive(Default)]
struct CountingDetector {
    calls: AtomicUsize,
}

impl AnomalyDetector for CountingDetector {
    fn predict(&self, _values: &[f64]) -> Result<AnomalyPrediction, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AnomalyPrediction {
            label: AnomalyLabel::Normal,
            score: 0.4,
            threshold: 0.6,
        })
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn rule_only_monitor() -> DriftMonitor {
    DriftMonitor::new(
        FeatureLayout::default(),
        RuleThresholds::default(),
        DriftLogger::in_memory(),
        Arc::new(Counters::new().unwrap()),
        false,
    )
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_typical_vector_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, config) = fitted(dir.path());

    assert_eq!(monitor.evaluate(&typical()), DriftVerdict::Clean);
    assert_eq!(line_count(&config.drift_log_path), 0);
    assert_eq!(monitor.counters().snapshot().drift_events, 0);
}

#[test]
fn test_non_positive_price_is_rule_drift() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, config) = fitted(dir.path());

    let verdict = monitor.evaluate(&vector(-5.0, 10.0, 0.0));
    assert_eq!(
        verdict,
        DriftVerdict::Drift(DriftReason::Rule {
            violation: RuleViolation::NonPositivePrice { price: -5.0 }
        })
    );
    assert_eq!(line_count(&config.drift_log_path), 2);
    assert_eq!(monitor.counters().snapshot().drift_events, 1);
}

#[test]
fn test_discount_above_price_is_rule_drift() {
    let monitor = rule_only_monitor();

    let verdict = monitor.evaluate(&vector(100.0, 150.0, 0.0));
    assert!(matches!(
        verdict,
        DriftVerdict::Drift(DriftReason::Rule {
            violation: RuleViolation::DiscountAbovePrice { .. }
        })
    ));
}

#[test]
fn test_missing_baseline_degrades_to_rule_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let monitor = monitor(&config);

    assert_eq!(monitor.fit_from_baseline(&config), MonitorMode::RuleOnly);
    assert_eq!(monitor.evaluate(&typical()), DriftVerdict::Clean);
    assert_eq!(monitor.evaluate(&outlier()), DriftVerdict::Clean);
    assert!(monitor.evaluate(&vector(0.0, 0.0, 0.0)).is_drift());

    let status = monitor.status();
    assert_eq!(status.mode, MonitorMode::RuleOnly);
    assert!(status.unavailable_reason.is_some());
    assert!(status.baseline.is_none());
    assert_eq!(status.counters.baseline_unavailable, 1);
}

#[test]
fn test_outlier_is_anomaly_drift() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, _) = fitted(dir.path());

    let verdict = monitor.evaluate(&outlier());
    match verdict {
        DriftVerdict::Drift(DriftReason::Anomaly { score, threshold }) => assert!(score > threshold),
        other => panic!("expected anomaly, got {:?}", other),
    }
}

#[test]
fn test_pending_until_fitted() {
    let monitor = rule_only_monitor();
    assert_eq!(monitor.mode(), MonitorMode::Pending);
    assert_eq!(monitor.evaluate(&outlier()), DriftVerdict::Clean);

    assert!(monitor.install_detector(Arc::new(CountingDetector::default())));
    assert_eq!(monitor.mode(), MonitorMode::Full);
    assert!(!monitor.install_detector(Arc::new(FailingDetector)));

    // Late failure report does not downgrade a fitted monitor
    monitor.mark_unavailable("late");
    assert_eq!(monitor.mode(), MonitorMode::Full);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_evaluation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, _) = fitted(dir.path());

    for v in [typical(), outlier(), vector(-1.0, 0.0, 0.0)] {
        assert_eq!(monitor.evaluate(&v), monitor.evaluate(&v));
    }
}

#[test]
fn test_log_rows_match_drift_events() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, config) = fitted(dir.path());

    for i in 0..7 {
        monitor.evaluate(&vector(-(i as f64), 1.0, 0.0));
    }
    for _ in 0..5 {
        monitor.evaluate(&typical());
    }

    assert_eq!(line_count(&config.drift_log_path), 8);
    assert_eq!(monitor.counters().snapshot().drift_events, 7);
    assert_eq!(monitor.recent(3).count, 3);
}

#[test]
fn test_concurrent_drift_evaluations() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let monitor = Arc::new(monitor(&config));
    let m = 40;

    let handles: Vec<_> = (0..m)
        .map(|_| {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || monitor.evaluate(&vector(-5.0, 10.0, 0.0)))
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap().is_drift());
    }

    let content = fs::read_to_string(&config.drift_log_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), m + 1);
    assert!(lines[1..].iter().all(|l| l.split(',').count() == 7));
    assert_eq!(monitor.counters().snapshot().drift_events, m as u64);
}

#[test]
fn test_drift_counter_never_ahead_of_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let monitor = Arc::new(monitor(&config));

    for i in 0..100u64 {
        let worker = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || monitor.evaluate(&vector(-5.0, 10.0, 0.0)))
        };

        // Observe the instant the counter moves
        while monitor.counters().snapshot().drift_events < i + 1 {
            thread::yield_now();
        }
        assert_eq!(line_count(&config.drift_log_path), i as usize + 2);
        assert_eq!(monitor.recent(usize::MAX).count, i as usize + 1);

        assert!(worker.join().unwrap().is_drift());
    }
}

#[test]
fn test_rule_violation_skips_detector() {
    let monitor = rule_only_monitor();
    let detector = Arc::new(CountingDetector::default());
    monitor.install_detector(detector.clone());

    monitor.evaluate(&vector(-5.0, 10.0, 0.0));
    assert_eq!(detector.calls.load(Ordering::SeqCst), 0);

    monitor.evaluate(&typical());
    assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_detector_failure_is_clean_and_counted() {
    let monitor = rule_only_monitor();
    monitor.install_detector(Arc::new(FailingDetector));

    assert_eq!(monitor.evaluate(&typical()), DriftVerdict::Clean);
    assert_eq!(monitor.counters().snapshot().model_failures, 1);
}

#[test]
fn test_non_finite_fields_treated_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let monitor = monitor(&config);

    let mut v = typical();
    v.price = f64::NAN;
    assert!(matches!(
        monitor.evaluate(&v),
        DriftVerdict::Drift(DriftReason::Rule {
            violation: RuleViolation::NonPositivePrice { .. }
        })
    ));

    // Logged row is the sanitised input
    let content = fs::read_to_string(&config.drift_log_path).unwrap();
    assert!(content.lines().nth(1).unwrap().ends_with(",20,80,0,5,4.2,30"));
}

#[test]
fn test_audit_mode_logs_every_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = MonitorConfig {
        audit_mode: true,
        ..config(dir.path())
    };
    let monitor = monitor(&config);

    monitor.evaluate(&typical());
    monitor.evaluate(&vector(-5.0, 10.0, 0.0));

    assert_eq!(line_count(&config.audit_log_path), 3);
    assert_eq!(line_count(&config.drift_log_path), 2);
}

#[test]
fn test_log_write_failure_does_not_change_verdict() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the log file should be
    let blocked = dir.path().join("blocked");
    fs::create_dir_all(&blocked).unwrap();

    let layout = FeatureLayout::default();
    let monitor = DriftMonitor::new(
        layout.clone(),
        RuleThresholds::default(),
        DriftLogger::new(&layout, Some(blocked), None),
        Arc::new(Counters::new().unwrap()),
        false,
    );

    assert!(monitor.evaluate(&vector(-5.0, 10.0, 0.0)).is_drift());
    let snap = monitor.counters().snapshot();
    assert_eq!(snap.drift_events, 1);
    assert_eq!(snap.log_write_failures, 1);
}

#[test]
fn test_batch_preserves_order() {
    let monitor = rule_only_monitor();
    let verdicts = monitor.evaluate_batch(&[typical(), vector(-1.0, 0.0, 0.0), typical()]);

    assert_eq!(verdicts.len(), 3);
    assert!(!verdicts[0].is_drift());
    assert!(verdicts[1].is_drift());
    assert!(!verdicts[2].is_drift());
}

#[test]
fn test_status_reports_fit() {
    let dir = tempfile::tempdir().unwrap();
    let (monitor, _) = fitted(dir.path());

    let status = monitor.status();
    assert_eq!(status.mode, MonitorMode::Full);
    assert_eq!(status.detector.as_deref(), Some("isolation_forest"));
    assert_eq!(status.baseline.as_ref().map(|b| b.samples), Some(600));
    assert_eq!(status.forest.as_ref().map(|f| f.sample_size), Some(256));
    assert_eq!(status.layout.feature_count, 6);
}
