//! Import operations, re-surfaced behind the unified error type.

use std::path::Path;

use epi_core::EngineConfig;
pub use epi_import::{ConflictPolicy, ImportReport};
use epi_model::Scenario;
use epi_store::DataStore;

use crate::error::AppResult;

pub fn import_rki(
    store: &DataStore,
    config: &EngineConfig,
    path: &Path,
) -> AppResult<ImportReport> {
    Ok(epi_import::import_rki(store, config, path)?)
}

pub fn import_scenario(store: &mut DataStore, config_path: &Path) -> AppResult<Scenario> {
    Ok(epi_import::import_scenario(store, config_path)?)
}

/// Import a simulation results folder. `policy` resolves a key
/// conflict; with none supplied an existing key surfaces as
/// [`crate::AppError::SimulationExists`] so a frontend can ask.
pub fn import_simulation(
    store: &DataStore,
    config: &EngineConfig,
    path: &Path,
    policy: Option<ConflictPolicy>,
) -> AppResult<ImportReport> {
    Ok(epi_import::import_simulation(store, config, path, policy)?)
}
