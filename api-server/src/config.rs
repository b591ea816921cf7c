//! Configuration module

use std::env;
use std::path::PathBuf;

use revenue_drift_core::logic::config::{parse_number, setting, ConfigError};
use revenue_drift_core::MonitorConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Drift monitor, baseline and log locations
    pub monitor: MonitorConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let lookup = |key: &str| env::var(key).ok();

        Self {
            host: env::var("API_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),

            port: setting(&lookup, "API_PORT", DEFAULT_PORT, |v| {
                let port = parse_number::<u16>("API_PORT", v)?;
                if port == 0 {
                    return Err(ConfigError::invalid("API_PORT", v, "must be in 1..=65535"));
                }
                Ok(port)
            }),

            monitor: MonitorConfig::from_lookup(lookup),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_path(&self) -> PathBuf {
        self.monitor.model_path()
    }
}
