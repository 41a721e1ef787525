//! epi-model: canonical domain schema, schema registry, and scenario
//! validation.

pub mod registry;
pub mod schema;
pub mod validate;

pub use registry::ModelRegistry;
pub use schema::*;
pub use validate::{ValidationError, validate_scenario};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Simulation model not found: {key}")]
    ModelNotFound { key: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
