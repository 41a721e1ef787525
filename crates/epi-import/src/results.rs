//! Result containers: hierarchical per-node array files.
//!
//! A container maps geographic-node identifier strings to named 2-D
//! datasets of shape `[day][compartment-index]`. `Results.json` carries
//! every node; `Results_sum.json` carries the single aggregate
//! pseudo-node under the identifier `"0"`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::{ImportError, ImportResult};

/// Key the summary container stores its pseudo-node under.
pub const SUMMARY_CONTAINER_KEY: &str = "0";

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsContainer {
    #[serde(flatten)]
    nodes: BTreeMap<String, NodeDatasets>,
}

pub type NodeDatasets = BTreeMap<String, Vec<Vec<f64>>>;

impl ResultsContainer {
    pub fn load(dir: &Path, file: &str) -> ImportResult<Self> {
        let path = dir.join(file);
        if !path.exists() {
            return Err(ImportError::MissingFile {
                file: file.to_string(),
                path: dir.to_path_buf(),
            });
        }
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    /// Raw node identifiers with their datasets, in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeDatasets)> {
        self.nodes.iter().map(|(id, datasets)| (id.as_str(), datasets))
    }

    pub fn node(&self, id: &str) -> Option<&NodeDatasets> {
        self.nodes.get(id)
    }
}

/// Per-node descriptor dropped next to simulation results.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphNodeDescriptor {
    #[serde(rename = "NodeId")]
    pub node_id: serde_json::Value,
}

impl GraphNodeDescriptor {
    pub fn load(path: &Path) -> ImportResult<Self> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    /// The node identifier as a string, however the descriptor spelled
    /// it (bare number or string).
    pub fn node_id_str(&self) -> String {
        match &self.node_id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
