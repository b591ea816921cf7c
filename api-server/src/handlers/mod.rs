//! HTTP handlers

pub mod drift;
pub mod health;
pub mod metrics;
pub mod predict;
