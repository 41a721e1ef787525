//! Simulation listing and deletion.

use epi_model::Simulation;
use epi_store::{DataStore, SimulationSummary};

use crate::error::AppResult;

/// List stored simulations, including the distinct percentiles each one
/// actually holds data for.
pub fn list_simulation_summaries(store: &DataStore) -> AppResult<Vec<SimulationSummary>> {
    let mut summaries = store.simulation_summaries()?;
    summaries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(summaries)
}

pub fn get_simulation(store: &DataStore, key: &str) -> AppResult<Simulation> {
    Ok(store.load_simulation(key)?)
}

/// Delete a simulation and all its data rows.
pub fn delete_simulation(store: &DataStore, key: &str) -> AppResult<()> {
    store.delete_simulation(key)?;
    Ok(())
}
