//! Reference ("RKI") data import.

use std::path::Path;

use tracing::info;

use epi_core::{EngineConfig, SUMMARY_NODE_KEY, canonical_node_key, parse_day};
use epi_store::DataStore;

use crate::dataset::{DatasetSpec, collect_node_rows};
use crate::metadata::{RKI_MANDATORY, RkiMetadata, load_metadata};
use crate::report::{ImportReport, SkipReason};
use crate::results::{ResultsContainer, SUMMARY_CONTAINER_KEY};
use crate::{ImportError, ImportResult};

/// Import a reference results folder into the store.
///
/// Every node container becomes one batch of flattened rows tagged with
/// the configured default percentile; the summary container is imported
/// last as pseudo-node `00000`. Row 0 is the first reported day and is
/// kept. Existing rows of each imported node are replaced; untouched
/// nodes keep theirs.
pub fn import_rki(
    store: &DataStore,
    config: &EngineConfig,
    path: &Path,
) -> ImportResult<ImportReport> {
    check_data_dir(path)?;

    let meta: RkiMetadata = load_metadata(path, RKI_MANDATORY)?;
    let start_day = parse_day(&meta.start_day)?;

    let results = ResultsContainer::load(path, "Results.json")?;
    let summary = ResultsContainer::load(path, "Results_sum.json")?;

    let spec = DatasetSpec {
        datasets: &meta.datasets,
        order: &meta.compartment_order,
        group_mapping: meta.group_mapping.as_ref(),
        start_day,
        percentile: config.default_percentile,
        expected_rows: None,
        skip_seed_row: false,
    };

    let mut report = ImportReport::default();
    let mut rows = Vec::new();

    for (node_id, datasets) in results.iter() {
        let padded = canonical_node_key(node_id, config.node_key_width);
        let Some(node) = store.reference().node(&padded) else {
            report.skip(&padded, SkipReason::UnknownNode);
            continue;
        };

        if collect_node_rows(store, node, datasets, &spec, &mut rows, &mut report) {
            report.nodes_imported += 1;
        }
    }

    // The nationwide aggregate, keyed "0" inside the summary container.
    if let Some(datasets) = summary.node(SUMMARY_CONTAINER_KEY) {
        match store.reference().node(SUMMARY_NODE_KEY) {
            Some(node) => {
                info!(node = SUMMARY_NODE_KEY, "importing summary container");
                if collect_node_rows(store, node, datasets, &spec, &mut rows, &mut report) {
                    report.nodes_imported += 1;
                }
            }
            None => report.skip(SUMMARY_NODE_KEY, SkipReason::UnknownNode),
        }
    }

    store.replace_rki_rows(&rows)?;
    info!(
        nodes = report.nodes_imported,
        entries = report.entries_created,
        skips = report.skips.len(),
        "reference import finished"
    );
    Ok(report)
}

pub(crate) fn check_data_dir(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ImportError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
