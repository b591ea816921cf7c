use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::types::{DetectorState, DriftReason, DriftVerdict, MonitorMode, MonitorStatus, RecentDrift};
use crate::logic::audit::{DriftLogger, LogDestination, LogRecord};
use crate::logic::baseline::{load_baseline, BaselineSummary};
use crate::logic::config::MonitorConfig;
use crate::logic::features::{FeatureLayout, FeatureVector, LayoutInfo};
use crate::logic::metrics::{Counters, MonitorErrorKind};
use crate::logic::model::{AnomalyDetector, ForestInfo, IsolationForest, IsolationForestConfig};
use crate::logic::rules::{RuleEngine, RuleThresholds};

// ============================================================================
// DRIFT MONITOR
// ============================================================================

/// Per-request drift evaluation: rules first, then the anomaly model.
///
/// Built once at startup and shared behind an `Arc`. The detector slot is
/// filled at most once; until then (or if fitting fails) only rules run.
pub struct DriftMonitor {
    layout: FeatureLayout,
    rules: RuleEngine,
    detector: OnceLock<Arc<dyn AnomalyDetector>>,
    state: RwLock<DetectorState>,
    forest: OnceLock<ForestInfo>,
    baseline: OnceLock<BaselineSummary>,
    logger: DriftLogger,
    counters: Arc<Counters>,
    audit_mode: bool,
}

impl DriftMonitor {
    pub fn new(
        layout: FeatureLayout,
        rules: RuleThresholds,
        logger: DriftLogger,
        counters: Arc<Counters>,
        audit_mode: bool,
    ) -> Self {
        Self {
            layout,
            rules: RuleEngine::new(rules),
            detector: OnceLock::new(),
            state: RwLock::new(DetectorState::Pending),
            forest: OnceLock::new(),
            baseline: OnceLock::new(),
            logger,
            counters,
            audit_mode,
        }
    }

    /// Monitor with log destinations from config, detector still pending
    pub fn from_config(config: &MonitorConfig, counters: Arc<Counters>) -> Self {
        let logger = DriftLogger::new(
            &config.layout,
            Some(config.drift_log_path.clone()),
            Some(config.audit_log_path.clone()),
        );

        Self::new(
            config.layout.clone(),
            config.rules.clone(),
            logger,
            counters,
            config.audit_mode,
        )
    }

    // ------------------------------------------------------------------------
    // Detector lifecycle
    // ------------------------------------------------------------------------

    /// Returns false if a detector was already installed
    pub fn install_detector(&self, detector: Arc<dyn AnomalyDetector>) -> bool {
        let name = detector.name().to_string();
        if self.detector.set(detector).is_err() {
            log::warn!("Anomaly detector already installed, ignoring '{}'", name);
            return false;
        }

        *self.state.write() = DetectorState::Ready;
        log::info!("Drift monitor running in full mode ({})", name);
        true
    }

    /// Switch a pending monitor to rule-only mode
    pub fn mark_unavailable(&self, reason: impl Into<String>) {
        if self.detector.get().is_some() {
            return;
        }

        let reason = reason.into();
        log::warn!("Anomaly model unavailable, rule-only mode: {}", reason);
        *self.state.write() = DetectorState::Unavailable(reason);
    }

    /// Load the baseline and fit the isolation forest.
    ///
    /// Blocks for the duration of the fit; servers run this off the request
    /// path. Any failure leaves the monitor in rule-only mode.
    pub fn fit_from_baseline(&self, config: &MonitorConfig) -> MonitorMode {
        let dataset = match load_baseline(&config.baseline_path, &self.layout) {
            Ok(dataset) => dataset,
            Err(e) => {
                self.counters.record_error(MonitorErrorKind::BaselineUnavailable);
                self.mark_unavailable(format!("baseline: {}", e));
                return self.mode();
            }
        };

        let _ = self.baseline.set(dataset.summary());
        self.fit_dataset(dataset.to_matrix().view(), config.forest.clone());
        self.mode()
    }

    fn fit_dataset(&self, data: ndarray::ArrayView2<f64>, forest_config: IsolationForestConfig) {
        match IsolationForest::fit(data, forest_config) {
            Ok(forest) => {
                let _ = self.forest.set(forest.info());
                self.install_detector(Arc::new(forest));
            }
            Err(e) => {
                self.counters.record_error(MonitorErrorKind::BaselineUnavailable);
                self.mark_unavailable(format!("fit: {}", e));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Evaluate one vector. Never fails; internal errors count as clean.
    pub fn evaluate(&self, vector: &FeatureVector) -> DriftVerdict {
        let features = vector.sanitized();

        let verdict = match self.rules.check(&features) {
            Some(violation) => DriftVerdict::Drift(DriftReason::Rule { violation }),
            None => self.score(&features),
        };

        let record = LogRecord::new(features);

        if let DriftVerdict::Drift(reason) = &verdict {
            log::warn!("Drift detected ({})", reason);
            // Row first: a counter value of N implies N rows already appended
            self.write(&record, LogDestination::Drift);
            self.counters.record_drift(1);
        }

        if self.audit_mode {
            self.write(&record, LogDestination::Audit);
        }

        verdict
    }

    /// Evaluate each vector independently, in input order
    pub fn evaluate_batch(&self, vectors: &[FeatureVector]) -> Vec<DriftVerdict> {
        vectors.iter().map(|v| self.evaluate(v)).collect()
    }

    fn score(&self, features: &FeatureVector) -> DriftVerdict {
        let Some(detector) = self.detector.get() else {
            return DriftVerdict::Clean;
        };

        match detector.predict(&features.to_values(&self.layout)) {
            Ok(prediction) if prediction.is_anomaly() => DriftVerdict::Drift(DriftReason::Anomaly {
                score: prediction.score,
                threshold: prediction.threshold,
            }),
            Ok(_) => DriftVerdict::Clean,
            Err(e) => {
                log::warn!("Anomaly model failed ({}), treating as normal", e);
                self.counters.record_error(MonitorErrorKind::ModelFailure);
                DriftVerdict::Clean
            }
        }
    }

    fn write(&self, record: &LogRecord, destination: LogDestination) {
        if let Err(e) = self.logger.append(record, destination) {
            log::error!("Failed to append {:?} log: {}", destination, e);
            self.counters.record_error(MonitorErrorKind::LogWrite);
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    pub fn mode(&self) -> MonitorMode {
        if self.detector.get().is_some() {
            return MonitorMode::Full;
        }

        match &*self.state.read() {
            DetectorState::Pending => MonitorMode::Pending,
            DetectorState::Ready => MonitorMode::Full,
            DetectorState::Unavailable(_) => MonitorMode::RuleOnly,
        }
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    pub fn status(&self) -> MonitorStatus {
        let unavailable_reason = match &*self.state.read() {
            DetectorState::Unavailable(reason) => Some(reason.clone()),
            _ => None,
        };

        MonitorStatus {
            mode: self.mode(),
            detector: self.detector.get().map(|d| d.name().to_string()),
            unavailable_reason,
            forest: self.forest.get().cloned(),
            layout: LayoutInfo::from(&self.layout),
            baseline: self.baseline.get().cloned(),
            counters: self.counters.snapshot(),
            audit_mode: self.audit_mode,
            drift_log: self
                .logger
                .path(LogDestination::Drift)
                .map(|p| p.display().to_string()),
            audit_log: self
                .logger
                .path(LogDestination::Audit)
                .map(|p| p.display().to_string()),
        }
    }

    pub fn recent(&self, limit: usize) -> RecentDrift {
        let records = self.logger.recent(limit);
        RecentDrift {
            count: records.len(),
            records,
        }
    }
}

impl std::fmt::Debug for DriftMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftMonitor")
            .field("mode", &self.mode())
            .field("layout", &self.layout)
            .field("audit_mode", &self.audit_mode)
            .finish()
    }
}
