//! Audit Module - Append-only drift and audit logs
//!
//! - `record.rs` - LogRecord (timestamp + evaluated vector)
//! - `writer.rs` - per-file CSV writer, one lock per destination
//!
//! Flagged records also stay in a small in-memory ring for `/drift/recent`.

pub mod record;
pub mod writer;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureLayout;

pub use record::LogRecord;
pub use writer::{CsvLogWriter, LogWriteError};

/// Recent flagged records kept in memory
pub const MAX_RECENT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogDestination {
    Drift,
    Audit,
}

// ============================================================================
// LOGGER
// ============================================================================

#[derive(Debug)]
pub struct DriftLogger {
    drift: Option<Arc<CsvLogWriter>>,
    audit: Option<Arc<CsvLogWriter>>,
    recent: Mutex<VecDeque<LogRecord>>,
}

impl DriftLogger {
    /// Build writers for the configured destinations.
    /// Both destinations on the same path share one writer.
    pub fn new(layout: &FeatureLayout, drift_path: Option<PathBuf>, audit_path: Option<PathBuf>) -> Self {
        let drift = drift_path.map(|p| Arc::new(CsvLogWriter::new(p, layout.clone())));

        let audit = match (audit_path, &drift) {
            (Some(p), Some(d)) if d.path() == p.as_path() => Some(Arc::clone(d)),
            (Some(p), _) => Some(Arc::new(CsvLogWriter::new(p, layout.clone()))),
            (None, _) => None,
        };

        Self {
            drift,
            audit,
            recent: Mutex::new(VecDeque::with_capacity(MAX_RECENT)),
        }
    }

    /// Logger with no file destinations; records only reach the recent cache
    pub fn in_memory() -> Self {
        Self {
            drift: None,
            audit: None,
            recent: Mutex::new(VecDeque::with_capacity(MAX_RECENT)),
        }
    }

    pub fn append(&self, record: &LogRecord, destination: LogDestination) -> Result<(), LogWriteError> {
        let writer = match destination {
            LogDestination::Drift => {
                self.remember(record);
                self.drift.as_ref()
            }
            LogDestination::Audit => self.audit.as_ref(),
        };

        match writer {
            Some(w) => w.append(record),
            None => Ok(()),
        }
    }

    fn remember(&self, record: &LogRecord) {
        let mut recent = self.recent.lock();
        if recent.len() >= MAX_RECENT {
            recent.pop_front();
        }
        recent.push_back(record.clone());
    }

    /// Newest first, at most `limit`
    pub fn recent(&self, limit: usize) -> Vec<LogRecord> {
        self.recent.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn path(&self, destination: LogDestination) -> Option<&Path> {
        match destination {
            LogDestination::Drift => self.drift.as_ref().map(|w| w.path()),
            LogDestination::Audit => self.audit.as_ref().map(|w| w.path()),
        }
    }

    pub fn shares_writer(&self) -> bool {
        match (&self.drift, &self.audit) {
            (Some(d), Some(a)) => Arc::ptr_eq(d, a),
            _ => false,
        }
    }
}
