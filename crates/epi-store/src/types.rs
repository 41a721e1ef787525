//! Store document and projection types.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use epi_model::{DataEntry, Group, GroupCategory, Node, Restriction};

/// Canonical reference entities, created once at setup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReferenceData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub group_categories: Vec<GroupCategory>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
}

impl ReferenceData {
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.key == key)
    }

    /// Group key → display name, for flattening.
    pub fn group_names(&self) -> HashMap<String, String> {
        self.groups
            .iter()
            .map(|g| (g.key.clone(), g.name.clone()))
            .collect()
    }
}

/// Denormalized projection of one data entry joined with its owning
/// node: the row shape the query engine filters over. Recomputed from
/// entries on write, never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataRow {
    pub node_key: String,
    pub node_name: String,
    /// Comma-joined group display names.
    pub groups: String,
    pub day: NaiveDate,
    pub percentile: i32,
    pub data: BTreeMap<String, f64>,
}

/// Flatten one entry into its query projection.
///
/// Unknown group keys fall back to the key itself so a row is never
/// dropped by the projection step.
pub fn flatten_entry(node: &Node, entry: &DataEntry, names: &HashMap<String, String>) -> DataRow {
    let groups = entry
        .groups
        .iter()
        .map(|key| names.get(key).unwrap_or(key).as_str())
        .collect::<Vec<_>>()
        .join(",");

    DataRow {
        node_key: node.key.clone(),
        node_name: node.name.clone(),
        groups,
        day: entry.day,
        percentile: entry.percentile,
        data: entry.data.clone(),
    }
}

/// Listing shape for stored simulations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub key: String,
    pub name: String,
    pub description: String,
    pub scenario: String,
    pub start_day: NaiveDate,
    pub number_of_days: u32,
    /// Distinct percentiles present in the stored data, ascending.
    pub percentiles: Vec<i32>,
}
