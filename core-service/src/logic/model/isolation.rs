//! Isolation Forest - unsupervised outlier detector
//!
//! Each tree recursively splits a random subsample of the baseline on a random
//! feature at a random value. Points far from the bulk are isolated in fewer
//! splits, so a short average path length means "anomalous". No scaling is
//! needed: splits are drawn inside each feature's own range.
//!
//! Score: `s(x) = 2^(-E[h(x)] / c(psi))`, in (0, 1], higher = more anomalous.

use std::time::Instant;

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::threshold::{ContaminationThreshold, DEFAULT_CONTAMINATION};
use super::{AnomalyDetector, AnomalyLabel, AnomalyPrediction, ModelError};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const DEFAULT_N_ESTIMATORS: usize = 100;
pub const DEFAULT_MAX_SAMPLES: usize = 256;
pub const DEFAULT_SEED: u64 = 42;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForestConfig {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn build(data: &ArrayView2<f64>, indices: Vec<usize>, height_limit: usize, rng: &mut StdRng) -> Self {
        Self {
            root: build_node(data, indices, 0, height_limit, rng),
        }
    }

    fn path_length(&self, x: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;

        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split { feature, value, left, right } => {
                    node = if x[*feature] < *value { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

fn build_node(
    data: &ArrayView2<f64>,
    indices: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf { size: indices.len() };
    }

    // Only features that still vary inside this node can split it
    let candidates: Vec<(usize, f64, f64)> = (0..data.ncols())
        .filter_map(|f| {
            let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                let v = data[[i, f]];
                (lo.min(v), hi.max(v))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();

    if candidates.is_empty() {
        return Node::Leaf { size: indices.len() };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let value = if (hi - lo).is_finite() {
        rng.gen_range(lo..hi)
    } else {
        // Range too wide to sample uniformly
        lo / 2.0 + hi / 2.0
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices.into_iter().partition(|&i| data[[i, feature]] < value);

    Node::Split {
        feature,
        value,
        left: Box::new(build_node(data, left, depth + 1, height_limit, rng)),
        right: Box::new(build_node(data, right, depth + 1, height_limit, rng)),
    }
}

/// Average path length of an unsuccessful BST search over n points, c(n)
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Fitted forest. Read-only after `fit`; safe to share across threads.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    n_features: usize,
    sample_size: usize,
    threshold: ContaminationThreshold,
    config: IsolationForestConfig,
}

/// Fit statistics for logs and status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestInfo {
    pub n_estimators: usize,
    pub sample_size: usize,
    pub n_features: usize,
    pub contamination: f64,
    pub score_threshold: f64,
    pub seed: u64,
}

impl IsolationForest {
    /// Train on a rows x features matrix
    pub fn fit(data: ArrayView2<f64>, config: IsolationForestConfig) -> Result<Self, ModelError> {
        let start = Instant::now();
        let (rows, n_features) = data.dim();

        if rows == 0 || n_features == 0 {
            return Err(ModelError::EmptyTraining);
        }
        if config.n_estimators == 0 {
            return Err(ModelError::InvalidConfig("n_estimators must be > 0".to_string()));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite);
        }

        let sample_size = config.max_samples.max(2).min(rows);
        let height_limit = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_estimators)
            .map(|_| {
                let indices = rand::seq::index::sample(&mut rng, rows, sample_size).into_vec();
                IsolationTree::build(&data, indices, height_limit, &mut rng)
            })
            .collect::<Vec<_>>();

        let mut forest = Self {
            trees,
            n_features,
            sample_size,
            threshold: ContaminationThreshold {
                contamination: config.contamination,
                score_threshold: 1.0,
            },
            config,
        };

        let scores: Vec<f64> = data
            .rows()
            .into_iter()
            .map(|row| forest.raw_score(&row.to_vec()))
            .collect();
        forest.threshold = ContaminationThreshold::from_scores(&scores, forest.config.contamination)?;

        log::info!(
            "Isolation forest fitted: {} trees, psi={}, {} features, threshold={:.4} ({} ms)",
            forest.trees.len(),
            sample_size,
            n_features,
            forest.threshold.score_threshold,
            start.elapsed().as_millis()
        );

        Ok(forest)
    }

    /// Anomaly score without input validation
    fn raw_score(&self, x: &[f64]) -> f64 {
        let mean_path = self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);

        if norm <= 0.0 {
            return 0.5;
        }
        2f64.powf(-mean_path / norm)
    }

    /// Anomaly score in (0, 1]
    pub fn score(&self, x: &[f64]) -> Result<f64, ModelError> {
        if x.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: x.len(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite);
        }

        Ok(self.raw_score(x))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold.score_threshold
    }

    pub fn info(&self) -> ForestInfo {
        ForestInfo {
            n_estimators: self.trees.len(),
            sample_size: self.sample_size,
            n_features: self.n_features,
            contamination: self.threshold.contamination,
            score_threshold: self.threshold.score_threshold,
            seed: self.config.seed,
        }
    }
}

impl AnomalyDetector for IsolationForest {
    fn predict(&self, values: &[f64]) -> Result<AnomalyPrediction, ModelError> {
        let score = self.score(values)?;
        let label = if self.threshold.is_anomaly(score) {
            AnomalyLabel::Anomalous
        } else {
            AnomalyLabel::Normal
        };

        Ok(AnomalyPrediction {
            label,
            score,
            threshold: self.threshold.score_threshold,
        })
    }

    fn name(&self) -> &str {
        "isolation_forest"
    }
}

// ============================================================================
// TESTS
// ============================================================================
