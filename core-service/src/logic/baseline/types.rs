use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureLayout, FeatureVector};

// ============================================================================
// BASELINE DATASET
// ============================================================================

/// Historical feature vectors describing "normal" traffic.
/// Loaded once at startup; immutable afterwards.
#[derive(Debug, Clone)]
pub struct BaselineDataset {
    layout: FeatureLayout,
    rows: Vec<FeatureVector>,
}

impl BaselineDataset {
    pub fn new(layout: FeatureLayout, rows: Vec<FeatureVector>) -> Self {
        Self { layout, rows }
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows x features matrix in layout order (anomaly model input)
    pub fn to_matrix(&self) -> Array2<f64> {
        let cols = self.layout.len();
        let mut matrix = Array2::<f64>::zeros((self.rows.len(), cols));

        for (i, row) in self.rows.iter().enumerate() {
            for (j, value) in row.to_values(&self.layout).into_iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }

        matrix
    }

    pub fn summary(&self) -> BaselineSummary {
        BaselineSummary::from_dataset(self)
    }
}

// ============================================================================
// BASELINE SUMMARY
// ============================================================================

/// Per-feature statistics of the baseline (for status reporting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub samples: usize,
    pub features: Vec<FeatureStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub mean: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
}

impl BaselineSummary {
    pub fn from_dataset(dataset: &BaselineDataset) -> Self {
        let n = dataset.len();
        let features = dataset
            .layout()
            .features()
            .iter()
            .map(|&feature| {
                let values: Vec<f64> = dataset.rows().iter().map(|r| r.get(feature)).collect();
                let mean = if n > 0 { values.iter().sum::<f64>() / n as f64 } else { 0.0 };
                let variance = if n > 0 {
                    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64
                } else {
                    0.0
                };
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

                FeatureStats {
                    name: feature.name().to_string(),
                    mean,
                    variance,
                    min: if n > 0 { min } else { 0.0 },
                    max: if n > 0 { max } else { 0.0 },
                }
            })
            .collect();

        Self { samples: n, features }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureStats> {
        self.features.iter().find(|f| f.name == name)
    }
}
