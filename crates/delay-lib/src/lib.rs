//! Flight delay prediction library
//!
//! This crate provides the core functionality for:
//! - Feature engineering (date-derived features and one-hot encoding)
//! - Gradient-boosted delay classification
//! - Pipeline and model persistence
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod model;
pub mod models;
pub mod observability;
pub mod pipeline;

pub use error::PipelineError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::ServiceMetrics;
