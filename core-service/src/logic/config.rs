//! Monitor configuration
//!
//! Loaded from environment variables. A value that does not parse or fails
//! validation is reported at warn and replaced by its default, so a bad
//! setting never stops the service from starting.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::*;
use crate::logic::features::FeatureLayout;
use crate::logic::model::threshold::validate_contamination;
use crate::logic::model::IsolationForestConfig;
use crate::logic::rules::RuleThresholds;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{key}={value}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Everything the drift monitor needs at startup
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub model_name: String,
    pub baseline_path: PathBuf,
    pub drift_log_path: PathBuf,
    pub audit_log_path: PathBuf,
    pub audit_mode: bool,
    pub layout: FeatureLayout,
    pub forest: IsolationForestConfig,
    pub rules: RuleThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let data_dir = PathBuf::from(text("DATA_DIR", DEFAULT_DATA_DIR));
        let models_dir = PathBuf::from(text("MODELS_DIR", DEFAULT_MODELS_DIR));

        let layout = setting(&lookup, "FEATURES", FeatureLayout::default(), |v| {
            FeatureLayout::parse(v).map_err(|e| ConfigError::invalid("FEATURES", v, e))
        });

        let contamination = setting(
            &lookup,
            "CONTAMINATION_RATE",
            crate::logic::model::DEFAULT_CONTAMINATION,
            |v| {
                let rate = parse_number::<f64>("CONTAMINATION_RATE", v)?;
                validate_contamination(rate).map_err(|e| ConfigError::invalid("CONTAMINATION_RATE", v, e))
            },
        );

        let defaults = IsolationForestConfig::default();
        let forest = IsolationForestConfig {
            n_estimators: setting(&lookup, "ANOMALY_ESTIMATORS", defaults.n_estimators, |v| {
                let n = parse_number::<usize>("ANOMALY_ESTIMATORS", v)?;
                if n == 0 {
                    return Err(ConfigError::invalid("ANOMALY_ESTIMATORS", v, "must be > 0"));
                }
                Ok(n)
            }),
            max_samples: setting(&lookup, "ANOMALY_MAX_SAMPLES", defaults.max_samples, |v| {
                let n = parse_number::<usize>("ANOMALY_MAX_SAMPLES", v)?;
                if n < 2 {
                    return Err(ConfigError::invalid("ANOMALY_MAX_SAMPLES", v, "must be > 1"));
                }
                Ok(n)
            }),
            contamination,
            seed: setting(&lookup, "RANDOM_STATE", defaults.seed, |v| {
                parse_number("RANDOM_STATE", v)
            }),
        };

        let rule_defaults = RuleThresholds::default();
        let rules = RuleThresholds {
            min_quantity: setting(&lookup, "RULE_MIN_QUANTITY", rule_defaults.min_quantity, |v| {
                parse_number("RULE_MIN_QUANTITY", v)
            }),
            max_quantity: setting(&lookup, "RULE_MAX_QUANTITY", rule_defaults.max_quantity, |v| {
                parse_optional("RULE_MAX_QUANTITY", v)
            }),
            min_rating: setting(&lookup, "RULE_MIN_RATING", rule_defaults.min_rating, |v| {
                parse_finite("RULE_MIN_RATING", v)
            }),
            max_rating: setting(&lookup, "RULE_MAX_RATING", rule_defaults.max_rating, |v| {
                if is_none(v) {
                    Ok(None)
                } else {
                    parse_finite("RULE_MAX_RATING", v).map(Some)
                }
            }),
        };

        let audit_mode = setting(&lookup, "AUDIT_MODE", false, |v| parse_bool("AUDIT_MODE", v));

        Self {
            baseline_path: data_dir.join(text("RAW_DATA_FILE", DEFAULT_RAW_DATA_FILE)),
            drift_log_path: data_dir.join(text("DRIFT_LOG_FILE", DEFAULT_DRIFT_LOG_FILE)),
            audit_log_path: data_dir.join(text("AUDIT_LOG_FILE", DEFAULT_AUDIT_LOG_FILE)),
            model_name: text("MODEL_NAME", DEFAULT_MODEL_NAME),
            data_dir,
            models_dir,
            audit_mode,
            layout,
            forest,
            rules,
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join(&self.model_name)
    }
}

// ============================================================================
// PARSING HELPERS
// ============================================================================

/// Read `key`, falling back to `default` (with a warning) when invalid
pub fn setting<T, L, P>(lookup: &L, key: &'static str, default: T, parse: P) -> T
where
    L: Fn(&str) -> Option<String>,
    P: FnOnce(&str) -> Result<T, ConfigError>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match parse(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Invalid configuration ({}), using default", e);
            default
        }
    }
}

pub fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::invalid(key, value, e))
}

fn parse_finite(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    let v = parse_number::<f64>(key, value)?;
    if !v.is_finite() {
        return Err(ConfigError::invalid(key, value, "must be finite"));
    }
    Ok(v)
}

fn parse_optional(key: &'static str, value: &str) -> Result<Option<i64>, ConfigError> {
    if is_none(value) {
        return Ok(None);
    }
    parse_number(key, value).map(Some)
}

fn is_none(value: &str) -> bool {
    value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("off")
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected true/false")),
    }
}
