//! Feature Vector - one pricing/sales observation
//!
//! Missing fields deserialize to zero. Non-finite floats are replaced by zero
//! in `sanitized()`; the drift path never rejects a vector.

use serde::{Deserialize, Serialize};

use super::layout::{Feature, FeatureLayout};

/// A single request's inputs, named as the serving API receives them
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureVector {
    pub discount_percent: f64,
    pub discounted_price: f64,
    pub price: f64,
    pub quantity_sold: i64,
    pub rating: f64,
    pub review_count: i64,
}

impl FeatureVector {
    /// Get feature by name
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::DiscountPercent => self.discount_percent,
            Feature::DiscountedPrice => self.discounted_price,
            Feature::Price => self.price,
            Feature::QuantitySold => self.quantity_sold as f64,
            Feature::Rating => self.rating,
            Feature::ReviewCount => self.review_count as f64,
        }
    }

    /// Set feature by name
    /// Integer columns are rounded; non-finite values become 0
    pub fn set(&mut self, feature: Feature, value: f64) {
        let value = if value.is_finite() { value } else { 0.0 };
        match feature {
            Feature::DiscountPercent => self.discount_percent = value,
            Feature::DiscountedPrice => self.discounted_price = value,
            Feature::Price => self.price = value,
            Feature::QuantitySold => self.quantity_sold = value.round() as i64,
            Feature::Rating => self.rating = value,
            Feature::ReviewCount => self.review_count = value.round() as i64,
        }
    }

    /// Copy with every non-finite float replaced by 0
    pub fn sanitized(&self) -> Self {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            discount_percent: clean(self.discount_percent),
            discounted_price: clean(self.discounted_price),
            price: clean(self.price),
            quantity_sold: self.quantity_sold,
            rating: clean(self.rating),
            review_count: self.review_count,
        }
    }

    /// Values in layout order (model input)
    pub fn to_values(&self, layout: &FeatureLayout) -> Vec<f64> {
        layout.features().iter().map(|&f| self.get(f)).collect()
    }

    /// Values in layout order as f32 (ONNX input)
    pub fn to_f32_values(&self, layout: &FeatureLayout) -> Vec<f32> {
        layout.features().iter().map(|&f| self.get(f) as f32).collect()
    }

    /// Render one CSV cell per layout feature
    pub fn csv_cells(&self, layout: &FeatureLayout) -> Vec<String> {
        layout
            .features()
            .iter()
            .map(|&f| {
                if f.is_integer() {
                    format!("{}", self.get(f) as i64)
                } else {
                    format!("{}", self.get(f))
                }
            })
            .collect()
    }
}
