//! Regressor - ONNX Runtime integration
//!
//! Load và chạy ONNX revenue model (exported from the training pipeline).
//! Input: `(batch, features)` f32 tensor in layout order.
//! Output: first output tensor, one revenue value per row.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::{FeatureLayout, FeatureVector};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model not found: {0}")]
    NotFound(String),

    #[error("failed to load model: {0}")]
    Load(String),

    #[error("inference failed: {0}")]
    Run(String),

    #[error("model returned {actual} values for {expected} rows")]
    OutputShape { expected: usize, actual: usize },
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Regressor metadata for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressorMetadata {
    pub model_path: String,
    pub features: usize,
    pub layout_hash: u32,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Engine status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressorStatus {
    pub metadata: RegressorMetadata,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

// ============================================================================
// REGRESSOR
// ============================================================================

pub struct Regressor {
    session: Mutex<Session>,
    output_name: String,
    layout: FeatureLayout,
    metadata: RegressorMetadata,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl Regressor {
    /// Load ONNX model từ file
    pub fn load(model_path: &Path, layout: &FeatureLayout) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX regressor from: {:?}", model_path);

        if !model_path.exists() {
            return Err(InferenceError::NotFound(model_path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::Load(format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Load(format!("optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::Load(e.to_string()))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Load("no output defined".to_string()))?;

        let metadata = RegressorMetadata {
            model_path: model_path.display().to_string(),
            features: layout.len(),
            layout_hash: layout.hash(),
            loaded_at: chrono::Utc::now(),
        };

        log::info!("ONNX regressor loaded ({} features, output '{}')", layout.len(), output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            layout: layout.clone(),
            metadata,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        })
    }

    /// Predict revenue for every row, in input order
    pub fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        let start_time = Instant::now();
        let cols = self.layout.len();

        let mut input_data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            input_data.extend(row.to_f32_values(&self.layout));
        }

        let input_array = Array2::<f32>::from_shape_vec((rows.len(), cols), input_data)
            .map_err(|e| InferenceError::Run(format!("array error: {}", e)))?;

        let input_tensor =
            Value::from_array(input_array).map_err(|e| InferenceError::Run(format!("tensor error: {}", e)))?;

        let predictions = {
            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![input_tensor])
                .map_err(|e| InferenceError::Run(e.to_string()))?;

            let output = outputs
                .get(&self.output_name)
                .ok_or_else(|| InferenceError::Run("no output".to_string()))?;

            let output_tensor = output
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::Run(format!("extract error: {}", e)))?;

            output_tensor.1.iter().map(|&v| v as f64).collect::<Vec<f64>>()
        };

        if predictions.len() < rows.len() {
            return Err(InferenceError::OutputShape {
                expected: rows.len(),
                actual: predictions.len(),
            });
        }

        self.latency_sum_us
            .fetch_add(start_time.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        // One column per row; extra columns (if any) are ignored
        let stride = predictions.len() / rows.len().max(1);
        Ok(predictions.iter().step_by(stride.max(1)).take(rows.len()).copied().collect())
    }

    pub fn status(&self) -> RegressorStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        RegressorStatus {
            metadata: self.metadata.clone(),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_v1.onnx");

        let result = Regressor::load(&path, &FeatureLayout::default());
        assert!(matches!(result, Err(InferenceError::NotFound(_))));
    }
}
