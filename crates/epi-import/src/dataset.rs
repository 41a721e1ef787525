//! Shared per-node dataset walk.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use epi_model::Node;
use epi_store::{DataRow, DataStore, flatten_entry};

use crate::entries::build_data_entries;
use crate::report::{ImportReport, SkipReason};
use crate::results::NodeDatasets;

/// Shape and partition expectations for one dataset walk.
pub(crate) struct DatasetSpec<'a> {
    pub datasets: &'a [String],
    pub order: &'a [String],
    pub group_mapping: Option<&'a BTreeMap<String, String>>,
    pub start_day: NaiveDate,
    pub percentile: i32,
    /// `Some(1 + number_of_days)` for simulation imports.
    pub expected_rows: Option<usize>,
    pub skip_seed_row: bool,
}

impl DatasetSpec<'_> {
    /// Group a dataset maps to: the explicit mapping when present,
    /// otherwise the dataset name itself.
    fn group_for<'b>(&'b self, dataset: &'b str) -> &'b str {
        self.group_mapping
            .and_then(|m| m.get(dataset))
            .map(String::as_str)
            .unwrap_or(dataset)
    }
}

/// Walk every declared dataset of one node container, appending the
/// flattened rows of each valid dataset to `rows` and recording one
/// skip per invalid dataset. Returns whether anything was imported.
pub(crate) fn collect_node_rows(
    store: &DataStore,
    node: &Node,
    datasets: &NodeDatasets,
    spec: &DatasetSpec<'_>,
    rows: &mut Vec<DataRow>,
    report: &mut ImportReport,
) -> bool {
    let group_names = store.reference().group_names();
    let mut imported_any = false;

    for dataset_name in spec.datasets {
        let group = spec.group_for(dataset_name);
        let unit = format!("{}/{}", node.key, dataset_name);

        if store.reference().group(group).is_none() {
            report.skip(&unit, SkipReason::UnknownGroup {
                group: group.to_string(),
            });
            continue;
        }

        let Some(dataset) = datasets.get(dataset_name) else {
            report.skip(&unit, SkipReason::NoDataForNode);
            continue;
        };
        if dataset.is_empty() {
            report.skip(&unit, SkipReason::NoDataForNode);
            continue;
        }

        if let Some(expected) = spec.expected_rows
            && dataset.len() != expected
        {
            report.skip(&unit, SkipReason::RowMismatch {
                expected,
                actual: dataset.len(),
            });
            continue;
        }

        // every row, not just the first: a ragged dataset must not
        // panic entry building
        if let Some(width) = dataset.iter().map(Vec::len).find(|w| *w != spec.order.len()) {
            report.skip(&unit, SkipReason::ColumnMismatch {
                expected: spec.order.len(),
                actual: width,
            });
            continue;
        }

        let entries = build_data_entries(
            spec.start_day,
            dataset,
            spec.order,
            group,
            spec.percentile,
            spec.skip_seed_row,
        );

        report.entries_created += entries.len();
        rows.extend(entries.iter().map(|e| flatten_entry(node, e, &group_names)));
        imported_any = true;
    }

    imported_any
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(mapping: Option<&BTreeMap<String, String>>) -> DatasetSpec<'_> {
        DatasetSpec {
            datasets: &[],
            order: &[],
            group_mapping: mapping,
            start_day: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            percentile: 50,
            expected_rows: None,
            skip_seed_row: false,
        }
    }

    #[test]
    fn group_mapping_defaults_to_dataset_name() {
        assert_eq!(spec(None).group_for("Group1"), "Group1");

        let mapping = BTreeMap::from([("Group1".to_string(), "age_0".to_string())]);
        assert_eq!(spec(Some(&mapping)).group_for("Group1"), "age_0");
        assert_eq!(spec(Some(&mapping)).group_for("Group2"), "Group2");
    }
}
