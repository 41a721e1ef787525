//! Domain schema definitions.
//!
//! One canonical shape per entity. Reference entities (nodes, groups,
//! restrictions) are immutable once created; scenario and simulation
//! documents own their children exclusively.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Geographic unit (county-equivalent) that data is keyed by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Stable 5-digit regional key, zero-padded.
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Category a demographic group belongs to (e.g. "age", "gender").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupCategory {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Demographic partition (e.g. an age band); belongs to exactly one
/// category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restriction {
    pub key: String,
    pub name: String,
    pub contact_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intervention {
    pub restriction: String,
    pub start_day: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_day: Option<NaiveDate>,
    pub contact_rate: f64,
}

/// Named simulation input declared by a model (e.g. "incubation").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Named epidemic state produced by a model (e.g. "infectious").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Compartment {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A simulation model: its declared parameter and compartment sets.
/// Order within the sets carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationModel {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub compartments: Vec<Compartment>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DistributionKind {
    #[default]
    Normal,
    Uniform,
}

/// Numeric range with an associated point value; used for parameter
/// uncertainty ranges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Distribution {
    #[serde(default)]
    pub kind: DistributionKind,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub value: f64,
}

/// One value range bound to one or more groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioParameterGroup {
    pub groups: Vec<String>,
    pub distribution: Distribution,
}

/// One model parameter configured for a scenario node, per group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioParameter {
    pub parameter: String,
    pub groups: Vec<ScenarioParameterGroup>,
}

/// One node's role in a scenario: its parameter distributions and any
/// active interventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioNode {
    pub node: String,
    pub parameters: Vec<ScenarioParameter>,
    #[serde(default)]
    pub interventions: Vec<Intervention>,
}

/// A reusable configuration of nodes, groups, and parameter
/// distributions. Owns its nodes exclusively; deleting the scenario
/// deletes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub simulation_model: String,
    pub number_of_groups: usize,
    pub number_of_nodes: usize,
    pub nodes: Vec<ScenarioNode>,
}

/// The atomic observation: one (day, percentile, group set) slice of
/// compartment values for some node. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataEntry {
    pub day: NaiveDate,
    pub percentile: i32,
    pub groups: Vec<String>,
    pub data: BTreeMap<String, f64>,
}

/// A scenario run over a fixed day range, populated by the import
/// engine one percentile folder at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Simulation {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub scenario: String,
    pub start_day: NaiveDate,
    pub number_of_days: u32,
}
