//! Central Configuration Constants
//!
//! Default locations of the baseline, the log files and the regressor
//! artifact. Environment variables in `logic::config` override them.

/// Base directory for baseline and logs
pub const DEFAULT_DATA_DIR: &str = "data";

/// Base directory for the regressor artifact
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Regressor file under the models directory
pub const DEFAULT_MODEL_NAME: &str = "model_v1.onnx";

/// Baseline CSV under the data directory
pub const DEFAULT_RAW_DATA_FILE: &str = "raw.csv";

pub const DEFAULT_DRIFT_LOG_FILE: &str = "drift_log.csv";
pub const DEFAULT_AUDIT_LOG_FILE: &str = "audit_log.csv";

