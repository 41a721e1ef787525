//! Import metadata and scenario config schemas.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::{ImportError, ImportResult};

/// Sentinel in `compartmentOrder` marking a column to skip.
pub const IGNORE_COLUMN: &str = "**ignore**";

/// `metadata.json` for a reference ("RKI") import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RkiMetadata {
    pub start_day: String,
    pub datasets: Vec<String>,
    pub compartment_order: Vec<String>,
    #[serde(default)]
    pub group_mapping: Option<BTreeMap<String, String>>,
}

/// `metadata.json` for a simulation import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationMetadata {
    pub key: String,
    pub name: String,
    pub description: String,
    pub start_day: String,
    pub number_of_days: u32,
    pub scenario: String,
    pub datasets: Vec<String>,
    pub compartment_order: Vec<String>,
    #[serde(default)]
    pub group_mapping: Option<BTreeMap<String, String>>,
}

/// Scenario import config.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub groups: Vec<ScenarioConfigGroup>,
    pub number_of_nodes: usize,
    pub nodes: Vec<String>,
    pub simulation_model: String,
    /// Parameter key → one or more value ranges, each scoped to either
    /// an explicit group list or a whole category.
    pub parameters: BTreeMap<String, Vec<ParameterValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfigGroup {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterValue {
    /// `[min, max]` pair.
    pub value: [f64; 2],
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

/// Read `metadata.json`, checking every mandatory key before the typed
/// parse so the failure names the first missing key.
pub fn load_metadata<T: serde::de::DeserializeOwned>(
    dir: &Path,
    mandatory: &[&str],
) -> ImportResult<T> {
    let path = dir.join("metadata.json");
    if !path.exists() {
        return Err(ImportError::MissingFile {
            file: "metadata.json".to_string(),
            path: dir.to_path_buf(),
        });
    }

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    for key in mandatory {
        if raw.get(key).is_none() {
            return Err(ImportError::MissingKey {
                key: (*key).to_string(),
            });
        }
    }

    Ok(serde_json::from_value(raw)?)
}

/// Mandatory metadata keys for a reference import.
pub const RKI_MANDATORY: &[&str] = &["startDay", "datasets", "compartmentOrder"];

/// Mandatory metadata keys for a simulation import.
pub const SIMULATION_MANDATORY: &[&str] = &[
    "key",
    "name",
    "description",
    "startDay",
    "numberOfDays",
    "scenario",
    "datasets",
    "compartmentOrder",
];

/// Mandatory scenario config keys.
pub const SCENARIO_MANDATORY: &[&str] = &[
    "key",
    "name",
    "groups",
    "numberOfNodes",
    "nodes",
    "simulationModel",
    "parameters",
];
