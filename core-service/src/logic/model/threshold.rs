//! Contamination Threshold
//!
//! The contamination rate is a prior on the fraction of baseline rows that
//! are themselves outliers. It picks the decision threshold as a quantile of
//! the training scores; it is not a hard cutoff on new data.

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Default expected outlier fraction
pub const DEFAULT_CONTAMINATION: f64 = 0.01;

/// Upper bound accepted for contamination
pub const MAX_CONTAMINATION: f64 = 0.5;

/// Validate a contamination rate
pub fn validate_contamination(rate: f64) -> Result<f64, ModelError> {
    if rate.is_finite() && rate > 0.0 && rate <= MAX_CONTAMINATION {
        Ok(rate)
    } else {
        Err(ModelError::InvalidContamination(rate))
    }
}

/// Linear-interpolated quantile (q in [0, 1]) of unsorted values
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Threshold derived from training scores
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContaminationThreshold {
    pub contamination: f64,
    pub score_threshold: f64,
}

impl ContaminationThreshold {
    /// Scores above the `(1 - contamination)` quantile are anomalous
    pub fn from_scores(scores: &[f64], contamination: f64) -> Result<Self, ModelError> {
        let contamination = validate_contamination(contamination)?;
        let score_threshold = quantile(scores, 1.0 - contamination).ok_or(ModelError::EmptyTraining)?;

        Ok(Self {
            contamination,
            score_threshold,
        })
    }

    pub fn is_anomaly(&self, score: f64) -> bool {
        score > self.score_threshold
    }
}
