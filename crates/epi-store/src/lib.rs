//! epi-store: directory-backed record store and flattened query
//! projections.

pub mod store;
pub mod types;

pub use store::DataStore;
pub use types::{DataRow, ReferenceData, SimulationSummary, flatten_entry};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store not initialized at {path}")]
    NotInitialized { path: String },

    #[error("Scenario not found: {key}")]
    ScenarioNotFound { key: String },

    #[error("Scenario '{key}' is still referenced by simulation '{simulation}'")]
    ScenarioInUse { key: String, simulation: String },

    #[error("Simulation not found: {key}")]
    SimulationNotFound { key: String },

    #[error("Simulation already exists: {key}")]
    SimulationExists { key: String },
}
