//! Schema registry: the static catalogue of simulation models.

use crate::schema::{Compartment, Parameter, SimulationModel};
use crate::{ModelError, ModelResult};

const SECIHURD_PARAMETERS: [&str; 17] = [
    "incubation",
    "infectious_mild",
    "serial_interval",
    "hospitalized_to_recovered",
    "infectious_to_hospitalized",
    "infectious_asympt",
    "hospitalized_to_icu",
    "icu_to_recovered",
    "icu_to_dead",
    "infected_from_contact",
    "carrier_infectability",
    "asymp_per_infectious",
    "risk_from_symptotic",
    "dead_per_icu",
    "hospitalized_per_infectious",
    "icu_per_hospitalized",
    "risk_from_symptomatic",
];

const SECIHURD_COMPARTMENTS: [&str; 8] = [
    "total",
    "dead",
    "exposed",
    "carrier",
    "infectious",
    "hospitalized",
    "icu",
    "recovered",
];

/// Catalogue of known simulation models. Built at setup, immutable
/// thereafter.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<SimulationModel>,
}

impl ModelRegistry {
    /// Registry with the built-in models.
    pub fn builtin() -> Self {
        Self {
            models: vec![secihurd()],
        }
    }

    pub fn from_models(models: Vec<SimulationModel>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[SimulationModel] {
        &self.models
    }

    pub fn get(&self, key: &str) -> ModelResult<&SimulationModel> {
        self.models
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| ModelError::ModelNotFound {
                key: key.to_string(),
            })
    }
}

fn named(key: &str) -> (String, String) {
    (key.to_string(), key.replace('_', " "))
}

/// The SECIHURD model: 17 parameters, 8 compartments.
pub fn secihurd() -> SimulationModel {
    let parameters = SECIHURD_PARAMETERS
        .iter()
        .map(|key| {
            let (key, name) = named(key);
            Parameter {
                key,
                name,
                description: String::new(),
            }
        })
        .collect();

    let compartments = SECIHURD_COMPARTMENTS
        .iter()
        .map(|key| {
            let (key, name) = named(key);
            Compartment {
                key,
                name,
                description: String::new(),
            }
        })
        .collect();

    SimulationModel {
        key: "secihurd".to_string(),
        name: "SECIHURD".to_string(),
        description: "Compartment model with susceptible, exposed, carrier, \
                      infectious, hospitalized, ICU, recovered and dead states"
            .to_string(),
        parameters,
        compartments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_secihurd() {
        let registry = ModelRegistry::builtin();
        let model = registry.get("secihurd").unwrap();
        assert_eq!(model.parameters.len(), 17);
        assert_eq!(model.compartments.len(), 8);
    }

    #[test]
    fn unknown_model_is_an_error() {
        let registry = ModelRegistry::builtin();
        assert!(registry.get("seir").is_err());
    }
}
