use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureLayout, FeatureVector};

/// One appended row: when, and exactly what was evaluated
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub features: FeatureVector,
}

impl LogRecord {
    pub fn new(features: FeatureVector) -> Self {
        Self {
            timestamp: Utc::now(),
            features,
        }
    }

    pub fn at(timestamp: DateTime<Utc>, features: FeatureVector) -> Self {
        Self { timestamp, features }
    }

    /// CSV row matching `FeatureLayout::csv_header`
    pub fn to_csv_row(&self, layout: &FeatureLayout) -> String {
        let mut row = self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);
        for cell in self.features.csv_cells(layout) {
            row.push(',');
            row.push_str(&cell);
        }
        row
    }
}
