//! Model Module - anomaly detection and revenue inference
//!
//! - `isolation.rs` - seeded Isolation Forest fitted on the baseline
//! - `threshold.rs` - contamination → decision threshold
//! - `inference.rs` - ONNX revenue regressor (thin I/O wrapper)

pub mod inference;
pub mod isolation;
pub mod threshold;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export common types
pub use inference::{InferenceError, Regressor, RegressorMetadata, RegressorStatus};
pub use isolation::{ForestInfo, IsolationForest, IsolationForestConfig};
pub use threshold::{ContaminationThreshold, DEFAULT_CONTAMINATION};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("no training rows")]
    EmptyTraining,

    #[error("contamination {0} outside (0, 0.5]")]
    InvalidContamination(f64),

    #[error("invalid model config: {0}")]
    InvalidConfig(String),

    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("non-finite feature value")]
    NonFinite,
}

// ============================================================================
// DETECTOR TRAIT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyLabel {
    Normal,
    Anomalous,
}

/// Prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPrediction {
    pub label: AnomalyLabel,
    pub score: f64,
    pub threshold: f64,
}

impl AnomalyPrediction {
    pub fn is_anomaly(&self) -> bool {
        self.label == AnomalyLabel::Anomalous
    }
}

/// Fitted outlier detector. Read-only after fitting, queried concurrently.
pub trait AnomalyDetector: Send + Sync {
    /// Classify one vector given in layout order
    fn predict(&self, values: &[f64]) -> Result<AnomalyPrediction, ModelError>;

    fn name(&self) -> &str;
}
