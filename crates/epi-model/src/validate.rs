//! Scenario validation logic.

use std::collections::HashSet;

use crate::schema::{Scenario, SimulationModel};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Scenario '{scenario}' declares {declared} nodes but owns {actual}")]
    NodeCountMismatch {
        scenario: String,
        declared: usize,
        actual: usize,
    },

    #[error("Scenario '{scenario}' node '{node}' is missing parameter '{parameter}'")]
    MissingParameter {
        scenario: String,
        node: String,
        parameter: String,
    },

    #[error("Scenario '{scenario}' references model '{expected}' but was validated against '{actual}'")]
    ModelMismatch {
        scenario: String,
        expected: String,
        actual: String,
    },

    #[error("Duplicate node '{node}' in scenario '{scenario}'")]
    DuplicateNode { scenario: String, node: String },
}

/// Check a scenario against the model it references.
///
/// Invariants: the owned node count equals `number_of_nodes`, node keys
/// are unique, and every node's parameter set covers every parameter the
/// model declares.
pub fn validate_scenario(
    scenario: &Scenario,
    model: &SimulationModel,
) -> Result<(), ValidationError> {
    if scenario.simulation_model != model.key {
        return Err(ValidationError::ModelMismatch {
            scenario: scenario.key.clone(),
            expected: scenario.simulation_model.clone(),
            actual: model.key.clone(),
        });
    }

    if scenario.nodes.len() != scenario.number_of_nodes {
        return Err(ValidationError::NodeCountMismatch {
            scenario: scenario.key.clone(),
            declared: scenario.number_of_nodes,
            actual: scenario.nodes.len(),
        });
    }

    let mut seen = HashSet::new();
    for node in &scenario.nodes {
        if !seen.insert(&node.node) {
            return Err(ValidationError::DuplicateNode {
                scenario: scenario.key.clone(),
                node: node.node.clone(),
            });
        }

        let configured: HashSet<&str> =
            node.parameters.iter().map(|p| p.parameter.as_str()).collect();
        for parameter in &model.parameters {
            if !configured.contains(parameter.key.as_str()) {
                return Err(ValidationError::MissingParameter {
                    scenario: scenario.key.clone(),
                    node: node.node.clone(),
                    parameter: parameter.key.clone(),
                });
            }
        }
    }

    Ok(())
}
