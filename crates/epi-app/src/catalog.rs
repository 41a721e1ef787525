//! Read access to the model registry and the reference entities.

use epi_model::{Compartment, Group, GroupCategory, Node, Parameter, Restriction, SimulationModel};
use epi_store::DataStore;

use crate::error::{AppError, AppResult};

/// Listing shape for models: identity plus set sizes, without the sets.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub key: String,
    pub name: String,
    pub description: String,
    pub parameter_count: usize,
    pub compartment_count: usize,
}

impl From<&SimulationModel> for ModelSummary {
    fn from(model: &SimulationModel) -> Self {
        ModelSummary {
            key: model.key.clone(),
            name: model.name.clone(),
            description: model.description.clone(),
            parameter_count: model.parameters.len(),
            compartment_count: model.compartments.len(),
        }
    }
}

pub fn list_models(store: &DataStore) -> Vec<ModelSummary> {
    store.models().iter().map(ModelSummary::from).collect()
}

pub fn get_model_summary(store: &DataStore, key: &str) -> AppResult<ModelSummary> {
    Ok(ModelSummary::from(lookup_model(store, key)?))
}

pub fn get_model_detail(store: &DataStore, key: &str) -> AppResult<SimulationModel> {
    Ok(lookup_model(store, key)?.clone())
}

pub fn list_compartments(store: &DataStore, model: &str) -> AppResult<Vec<Compartment>> {
    Ok(lookup_model(store, model)?.compartments.clone())
}

pub fn list_parameters(store: &DataStore, model: &str) -> AppResult<Vec<Parameter>> {
    Ok(lookup_model(store, model)?.parameters.clone())
}

pub fn list_nodes(store: &DataStore) -> Vec<Node> {
    store.reference().nodes.clone()
}

pub fn list_groups(store: &DataStore) -> Vec<Group> {
    store.reference().groups.clone()
}

pub fn list_group_categories(store: &DataStore) -> Vec<GroupCategory> {
    store.reference().group_categories.clone()
}

pub fn list_restrictions(store: &DataStore) -> Vec<Restriction> {
    store.reference().restrictions.clone()
}

fn lookup_model<'a>(store: &'a DataStore, key: &str) -> AppResult<&'a SimulationModel> {
    store
        .model(key)
        .ok_or_else(|| AppError::ModelNotFound(key.to_string()))
}
