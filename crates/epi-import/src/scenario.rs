//! Scenario construction from a JSON config.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use epi_model::{
    Distribution, Group, Scenario, ScenarioNode, ScenarioParameter, ScenarioParameterGroup,
    validate_scenario,
};
use epi_store::DataStore;

use crate::metadata::{ParameterValue, SCENARIO_MANDATORY, ScenarioConfig};
use crate::{ImportError, ImportResult};

/// Build and persist a scenario from a config file.
///
/// Groups named by the config are created when missing (and complete
/// enough to create); nodes and the simulation model must already
/// exist. The finished scenario is validated against its model before
/// anything is written.
pub fn import_scenario(store: &mut DataStore, config_path: &Path) -> ImportResult<Scenario> {
    let config = load_config(config_path)?;

    let model = store
        .model(&config.simulation_model)
        .ok_or_else(|| ImportError::ModelNotFound {
            key: config.simulation_model.clone(),
        })?
        .clone();

    // Create config-carried groups that don't exist yet.
    for group_info in &config.groups {
        if store.reference().group(&group_info.key).is_some() {
            continue;
        }
        let (Some(name), Some(category)) = (&group_info.name, &group_info.category) else {
            continue;
        };
        if !store
            .reference()
            .group_categories
            .iter()
            .any(|c| &c.key == category)
        {
            return Err(ImportError::CategoryNotFound {
                key: category.clone(),
            });
        }
        store.add_group(Group {
            key: group_info.key.clone(),
            name: name.clone(),
            description: group_info.description.clone().unwrap_or_default(),
            category: category.clone(),
        })?;
    }

    let mut nodes = Vec::with_capacity(config.nodes.len());
    for node_key in &config.nodes {
        if store.reference().node(node_key).is_none() {
            return Err(ImportError::NodeNotFound {
                key: node_key.clone(),
            });
        }

        let mut parameters = Vec::with_capacity(model.parameters.len());
        for parameter in &model.parameters {
            let values = config.parameters.get(&parameter.key).ok_or_else(|| {
                ImportError::ParameterValuesMissing {
                    parameter: parameter.key.clone(),
                }
            })?;

            parameters.push(ScenarioParameter {
                parameter: parameter.key.clone(),
                groups: build_parameter_groups(store, values)?,
            });
        }

        nodes.push(ScenarioNode {
            node: node_key.clone(),
            parameters,
            interventions: Vec::new(),
        });
    }

    let scenario = Scenario {
        key: config.key.clone(),
        name: config.name.clone(),
        description: config.description.clone(),
        simulation_model: model.key.clone(),
        number_of_groups: config.groups.len(),
        number_of_nodes: config.number_of_nodes,
        nodes,
    };

    validate_scenario(&scenario, &model)?;
    store.save_scenario(&scenario)?;

    info!(scenario = %scenario.key, nodes = scenario.nodes.len(), "imported scenario");
    Ok(scenario)
}

/// One [`ScenarioParameterGroup`] per configured group of each value
/// range; a `category` entry fans out to every group of that category.
fn build_parameter_groups(
    store: &DataStore,
    values: &[ParameterValue],
) -> ImportResult<Vec<ScenarioParameterGroup>> {
    let mut parameter_groups = Vec::new();

    for value in values {
        let [min, max] = value.value;

        let group_lists: Vec<String> = if let Some(category) = &value.category {
            if !store
                .reference()
                .group_categories
                .iter()
                .any(|c| &c.key == category)
            {
                return Err(ImportError::CategoryNotFound {
                    key: category.clone(),
                });
            }
            store
                .reference()
                .groups
                .iter()
                .filter(|g| &g.category == category)
                .map(|g| g.key.clone())
                .collect()
        } else {
            value.groups.clone().unwrap_or_default()
        };

        for group_list in group_lists {
            // a list entry may itself be comma-joined
            let groups = group_list
                .split(',')
                .map(|g| g.trim().to_string())
                .collect();

            parameter_groups.push(ScenarioParameterGroup {
                groups,
                distribution: Distribution {
                    kind: Default::default(),
                    min,
                    max,
                    value: 0.0,
                },
            });
        }
    }

    Ok(parameter_groups)
}

fn load_config(path: &Path) -> ImportResult<ScenarioConfig> {
    if !path.exists() {
        return Err(ImportError::PathNotFound {
            path: path.to_path_buf(),
        });
    }

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    for key in SCENARIO_MANDATORY {
        if raw.get(key).is_none() {
            return Err(ImportError::MissingKey {
                key: (*key).to_string(),
            });
        }
    }

    Ok(serde_json::from_value(raw)?)
}
