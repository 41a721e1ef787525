//! Structured import outcome.
//!
//! Every skipped dataset or node ends up here in addition to the
//! per-occurrence log line, so a caller can tell a clean import from a
//! partial one.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No group exists for the dataset's mapped group key.
    UnknownGroup { group: String },
    /// Dataset column count does not match the compartment order.
    ColumnMismatch { expected: usize, actual: usize },
    /// Dataset row count does not match `1 + numberOfDays`.
    RowMismatch { expected: usize, actual: usize },
    /// Node identifier does not resolve to a known node.
    UnknownNode,
    /// Node is not part of the simulation's scenario.
    NodeNotInScenario { scenario: String },
    /// Descriptor references a node the results container lacks.
    NoDataForNode,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownGroup { group } => {
                write!(f, "no group for key '{group}' found")
            }
            SkipReason::ColumnMismatch { expected, actual } => write!(
                f,
                "compartment order length {expected} does not match column count {actual}"
            ),
            SkipReason::RowMismatch { expected, actual } => write!(
                f,
                "expected {expected} rows (seed + days) but found {actual}"
            ),
            SkipReason::UnknownNode => write!(f, "node does not exist"),
            SkipReason::NodeNotInScenario { scenario } => {
                write!(f, "node is not part of scenario '{scenario}'")
            }
            SkipReason::NoDataForNode => write!(f, "no data found for node"),
        }
    }
}

/// One skipped unit: the dataset or node it applies to, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    /// Node key, or node + dataset for dataset-level skips.
    pub unit: String,
    pub reason: SkipReason,
}

/// Summary of one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub nodes_imported: usize,
    pub entries_created: usize,
    pub skips: Vec<Skip>,
}

impl ImportReport {
    pub fn skip(&mut self, unit: impl Into<String>, reason: SkipReason) {
        let unit = unit.into();
        tracing::warn!(unit = %unit, reason = %reason, "skipping during import");
        self.skips.push(Skip { unit, reason });
    }

    pub fn is_clean(&self) -> bool {
        self.skips.is_empty()
    }

    pub fn merge(&mut self, other: ImportReport) {
        self.nodes_imported += other.nodes_imported;
        self.entries_created += other.entries_created;
        self.skips.extend(other.skips);
    }
}
