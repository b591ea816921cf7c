use serde::{Deserialize, Serialize};

use crate::logic::audit::LogRecord;
use crate::logic::baseline::BaselineSummary;
use crate::logic::features::LayoutInfo;
use crate::logic::metrics::CounterSnapshot;
use crate::logic::model::ForestInfo;
use crate::logic::rules::RuleViolation;

// ============================================================================
// VERDICT
// ============================================================================

/// Why a vector was flagged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DriftReason {
    Rule { violation: RuleViolation },
    Anomaly { score: f64, threshold: f64 },
}

impl DriftReason {
    /// Short label used for grouping, e.g. `rule:non_positive_price`
    pub fn code(&self) -> String {
        match self {
            DriftReason::Rule { violation } => format!("rule:{}", violation.code()),
            DriftReason::Anomaly { .. } => "anomaly".to_string(),
        }
    }
}

impl std::fmt::Display for DriftReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriftReason::Rule { violation } => write!(f, "rule: {}", violation),
            DriftReason::Anomaly { score, threshold } => {
                write!(f, "anomaly: score {:.4} > threshold {:.4}", score, threshold)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum DriftVerdict {
    Clean,
    Drift(DriftReason),
}

impl DriftVerdict {
    pub fn is_drift(&self) -> bool {
        matches!(self, DriftVerdict::Drift(_))
    }

    pub fn reason(&self) -> Option<&DriftReason> {
        match self {
            DriftVerdict::Drift(reason) => Some(reason),
            DriftVerdict::Clean => None,
        }
    }
}

// ============================================================================
// MODE / STATUS
// ============================================================================

/// Which checks `evaluate` currently runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorMode {
    /// Rules and anomaly model
    Full,
    /// Anomaly model unavailable, rules only
    RuleOnly,
    /// Anomaly model still fitting, rules only for now
    Pending,
}

impl MonitorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorMode::Full => "full",
            MonitorMode::RuleOnly => "rule_only",
            MonitorMode::Pending => "pending",
        }
    }
}

impl std::fmt::Display for MonitorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DetectorState {
    Pending,
    Ready,
    Unavailable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub mode: MonitorMode,
    pub detector: Option<String>,
    pub unavailable_reason: Option<String>,
    pub forest: Option<ForestInfo>,
    pub layout: LayoutInfo,
    pub baseline: Option<BaselineSummary>,
    pub counters: CounterSnapshot,
    pub audit_mode: bool,
    pub drift_log: Option<String>,
    pub audit_log: Option<String>,
}

/// Recent flagged records, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDrift {
    pub count: usize,
    pub records: Vec<LogRecord>,
}
