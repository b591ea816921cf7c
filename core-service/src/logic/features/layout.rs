//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The regressor and the anomaly model are both trained on vectors in a fixed
//! column order. The order is configuration-driven (`FEATURES`), but once a
//! model artifact is deployed it must not change: a different order silently
//! feeds the wrong column into every tree.
//!
//! ## Rules (NEVER break these):
//! 1. Add a `Feature` variant → increment LAYOUT_VERSION
//! 2. Rename a feature → increment LAYOUT_VERSION

use std::fmt;
use std::str::FromStr;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// LAYOUT VERSION
// ============================================================================

/// Current feature schema version
/// MUST be incremented when the `Feature` set changes
pub const LAYOUT_VERSION: u8 = 1;

/// Number of known features
pub const FEATURE_COUNT: usize = 6;

// ============================================================================
// FEATURES
// ============================================================================

/// Every numeric input the revenue model understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    DiscountPercent,
    DiscountedPrice,
    Price,
    QuantitySold,
    Rating,
    ReviewCount,
}

impl Feature {
    /// Canonical training order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::DiscountPercent,
        Feature::DiscountedPrice,
        Feature::Price,
        Feature::QuantitySold,
        Feature::Rating,
        Feature::ReviewCount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::DiscountPercent => "discount_percent",
            Feature::DiscountedPrice => "discounted_price",
            Feature::Price => "price",
            Feature::QuantitySold => "quantity_sold",
            Feature::Rating => "rating",
            Feature::ReviewCount => "review_count",
        }
    }

    /// Integer-valued columns are written without a fractional part
    pub fn is_integer(&self) -> bool {
        matches!(self, Feature::QuantitySold | Feature::ReviewCount)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.name() == name)
            .ok_or_else(|| LayoutError::UnknownFeature(name.to_string()))
    }
}

// ============================================================================
// LAYOUT ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("feature '{0}' listed more than once")]
    DuplicateFeature(String),

    #[error("feature layout is empty")]
    Empty,
}

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Ordered list of features fed to the models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    features: Vec<Feature>,
}

impl FeatureLayout {
    pub fn new(features: Vec<Feature>) -> Result<Self, LayoutError> {
        if features.is_empty() {
            return Err(LayoutError::Empty);
        }

        for (i, f) in features.iter().enumerate() {
            if features[..i].contains(f) {
                return Err(LayoutError::DuplicateFeature(f.name().to_string()));
            }
        }

        Ok(Self { features })
    }

    /// Parse a comma-separated list such as `price,rating`
    pub fn parse(list: &str) -> Result<Self, LayoutError> {
        let features = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Feature::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(features)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(Feature::name).collect()
    }

    /// Position of a feature in this layout
    pub fn index_of(&self, feature: Feature) -> Option<usize> {
        self.features.iter().position(|&f| f == feature)
    }

    /// CRC32 of version + ordered names
    /// Used to tell which training layout a deployment runs with
    pub fn hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[LAYOUT_VERSION]);

        for f in &self.features {
            hasher.update(f.name().as_bytes());
            hasher.update(&[0]); // Separator
        }

        hasher.finalize()
    }

    /// CSV header row for log files: `timestamp` then one column per feature
    pub fn csv_header(&self) -> String {
        let mut header = String::from("timestamp");
        for name in self.names() {
            header.push(',');
            header.push_str(name);
        }
        header
    }
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self {
            features: Feature::ALL.to_vec(),
        }
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout information for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl From<&FeatureLayout> for LayoutInfo {
    fn from(layout: &FeatureLayout) -> Self {
        Self {
            version: LAYOUT_VERSION,
            hash: layout.hash(),
            feature_count: layout.len(),
            feature_names: layout.names().into_iter().map(String::from).collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
