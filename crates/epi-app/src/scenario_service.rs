//! Scenario listing, detail, and deletion.

use epi_model::Scenario;
use epi_store::DataStore;

use crate::error::AppResult;

/// Listing shape for scenarios: identity and sizes, without the nodes.
#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub key: String,
    pub name: String,
    pub description: String,
    pub simulation_model: String,
    pub number_of_nodes: usize,
    pub number_of_groups: usize,
}

impl From<&Scenario> for ScenarioSummary {
    fn from(scenario: &Scenario) -> Self {
        ScenarioSummary {
            key: scenario.key.clone(),
            name: scenario.name.clone(),
            description: scenario.description.clone(),
            simulation_model: scenario.simulation_model.clone(),
            number_of_nodes: scenario.number_of_nodes,
            number_of_groups: scenario.number_of_groups,
        }
    }
}

pub fn list_scenario_summaries(store: &DataStore) -> AppResult<Vec<ScenarioSummary>> {
    let mut summaries: Vec<ScenarioSummary> = store
        .list_scenarios()?
        .iter()
        .map(ScenarioSummary::from)
        .collect();
    summaries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(summaries)
}

pub fn get_scenario_detail(store: &DataStore, key: &str) -> AppResult<Scenario> {
    Ok(store.load_scenario(key)?)
}

/// Delete a scenario and the nodes it owns. Refused while any
/// simulation still references it.
pub fn delete_scenario(store: &DataStore, key: &str) -> AppResult<()> {
    store.delete_scenario(key)?;
    Ok(())
}
