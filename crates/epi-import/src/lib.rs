//! epi-import: ingestion of external result files into the record
//! store.
//!
//! Three entry points, matching the operator commands they back:
//! - [`import_rki`]: reference data import (one results container, all
//!   nodes, percentile fixed to the configured default)
//! - [`import_scenario`]: scenario construction from a JSON config
//! - [`import_simulation`]: simulation import (one sub-folder per
//!   percentile, per-node descriptor files)
//!
//! Validation failures whose unit is a single dataset or node are
//! skipped, logged, and counted in the returned [`ImportReport`];
//! anything that would leave the store inconsistent aborts before the
//! first write.

mod dataset;
pub mod entries;
pub mod metadata;
pub mod report;
pub mod results;
pub mod rki;
pub mod scenario;
pub mod simulation;

pub use entries::build_data_entries;
pub use metadata::{IGNORE_COLUMN, RkiMetadata, ScenarioConfig, SimulationMetadata};
pub use report::{ImportReport, Skip, SkipReason};
pub use results::ResultsContainer;
pub use rki::import_rki;
pub use scenario::import_scenario;
pub use simulation::{ConflictPolicy, import_simulation};

use std::path::PathBuf;

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("Could not find path {path}")]
    PathNotFound { path: PathBuf },

    #[error(
        "Path {path} is not a directory (archives must be extracted before import)"
    )]
    NotADirectory { path: PathBuf },

    #[error("No {file} found in data folder {path}")]
    MissingFile { file: String, path: PathBuf },

    #[error("Mandatory key '{key}' is missing in metadata file")]
    MissingKey { key: String },

    #[error("Scenario '{key}' does not exist")]
    ScenarioNotFound { key: String },

    #[error("Simulation model '{key}' does not exist")]
    ModelNotFound { key: String },

    #[error("Compartment '{compartment}' of model '{model}' not found in compartment order")]
    CompartmentNotInOrder { compartment: String, model: String },

    #[error("No percentile folders found to import")]
    NoPercentiles,

    #[error(
        "Simulation '{key}' already exists; choose to replace or append before re-importing"
    )]
    SimulationExists { key: String },

    #[error("Node '{key}' does not exist")]
    NodeNotFound { key: String },

    #[error("Values for parameter '{parameter}' are missing")]
    ParameterValuesMissing { parameter: String },

    #[error("Group category '{key}' does not exist")]
    CategoryNotFound { key: String },

    #[error("Scenario validation failed: {0}")]
    Validation(#[from] epi_model::ValidationError),

    #[error("Core error: {0}")]
    Core(#[from] epi_core::CoreError),

    #[error("Store error: {0}")]
    Store(#[from] epi_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
