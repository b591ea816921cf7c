//! Features Module - request schema shared by both models
//!
//! - `layout.rs` - feature names, configurable order, layout hash
//! - `vector.rs` - `FeatureVector` (named numeric fields)

pub mod layout;
pub mod vector;


// Re-export common types
pub use layout::{Feature, FeatureLayout, LayoutError, LayoutInfo, FEATURE_COUNT};
pub use vector::FeatureVector;
