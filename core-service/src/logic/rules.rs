//! Rule Engine - hard domain constraints
//!
//! Physical impossibilities (negative prices, a discounted price above the
//! list price, ratings off the 1-5 scale) are flagged before the anomaly model
//! runs. Pure functions, no side effects.
//!
//! Checks run in priority order and stop at the first violation.

use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;

// ============================================================================
// DEFAULT THRESHOLDS
// ============================================================================

pub const DEFAULT_MIN_QUANTITY: i64 = 1;
pub const DEFAULT_MAX_QUANTITY: i64 = 500;
pub const DEFAULT_MIN_RATING: f64 = 1.0;
pub const DEFAULT_MAX_RATING: f64 = 5.0;

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Bounds for the quantity and rating checks.
/// The price checks are fixed: they encode logical impossibilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// quantity_sold below this violates
    pub min_quantity: i64,
    /// quantity_sold above this violates (None = unbounded)
    pub max_quantity: Option<i64>,
    /// rating below this violates
    pub min_rating: f64,
    /// rating above this violates (None = unbounded)
    pub max_rating: Option<f64>,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            min_quantity: DEFAULT_MIN_QUANTITY,
            max_quantity: Some(DEFAULT_MAX_QUANTITY),
            min_rating: DEFAULT_MIN_RATING,
            max_rating: Some(DEFAULT_MAX_RATING),
        }
    }
}

impl RuleThresholds {
    /// Loosest bounds: only negative quantities and sub-1 ratings violate
    pub fn lenient() -> Self {
        Self {
            min_quantity: 0,
            max_quantity: None,
            min_rating: DEFAULT_MIN_RATING,
            max_rating: None,
        }
    }
}

// ============================================================================
// VIOLATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleViolation {
    NonPositivePrice { price: f64 },
    NegativeDiscountedPrice { discounted_price: f64 },
    DiscountAbovePrice { discounted_price: f64, price: f64 },
    QuantityOutOfRange { quantity_sold: i64 },
    RatingOutOfRange { rating: f64 },
}

impl RuleViolation {
    pub fn code(&self) -> &'static str {
        match self {
            RuleViolation::NonPositivePrice { .. } => "non_positive_price",
            RuleViolation::NegativeDiscountedPrice { .. } => "negative_discounted_price",
            RuleViolation::DiscountAbovePrice { .. } => "discount_above_price",
            RuleViolation::QuantityOutOfRange { .. } => "quantity_out_of_range",
            RuleViolation::RatingOutOfRange { .. } => "rating_out_of_range",
        }
    }
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleViolation::NonPositivePrice { price } => write!(f, "price {} <= 0", price),
            RuleViolation::NegativeDiscountedPrice { discounted_price } => {
                write!(f, "discounted_price {} < 0", discounted_price)
            }
            RuleViolation::DiscountAbovePrice { discounted_price, price } => {
                write!(f, "discounted_price {} > price {}", discounted_price, price)
            }
            RuleViolation::QuantityOutOfRange { quantity_sold } => {
                write!(f, "quantity_sold {} out of range", quantity_sold)
            }
            RuleViolation::RatingOutOfRange { rating } => write!(f, "rating {} out of range", rating),
        }
    }
}

// ============================================================================
// RULE ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    thresholds: RuleThresholds,
}

impl RuleEngine {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// First violated constraint, if any
    pub fn check(&self, v: &FeatureVector) -> Option<RuleViolation> {
        let t = &self.thresholds;

        // NaN compares false everywhere; treat it as the zero it stands in for
        let price = finite_or_zero(v.price);
        let discounted_price = finite_or_zero(v.discounted_price);
        let rating = finite_or_zero(v.rating);

        if price <= 0.0 {
            return Some(RuleViolation::NonPositivePrice { price });
        }

        if discounted_price < 0.0 {
            return Some(RuleViolation::NegativeDiscountedPrice { discounted_price });
        }

        if discounted_price > price {
            return Some(RuleViolation::DiscountAbovePrice { discounted_price, price });
        }

        let quantity = v.quantity_sold;
        if quantity < t.min_quantity || t.max_quantity.map_or(false, |max| quantity > max) {
            return Some(RuleViolation::QuantityOutOfRange { quantity_sold: quantity });
        }

        if rating < t.min_rating || t.max_rating.map_or(false, |max| rating > max) {
            return Some(RuleViolation::RatingOutOfRange { rating });
        }

        None
    }

    pub fn is_violated(&self, v: &FeatureVector) -> bool {
        self.check(v).is_some()
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

// ============================================================================
// TESTS
// ============================================================================
