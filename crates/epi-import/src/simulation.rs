//! Simulation result import.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use epi_core::{
    EngineConfig, SUMMARY_NODE_KEY, canonical_node_key, parse_day, parse_percentile_dir,
};
use epi_model::Simulation;
use epi_store::DataStore;

use crate::dataset::{DatasetSpec, collect_node_rows};
use crate::metadata::{IGNORE_COLUMN, SIMULATION_MANDATORY, SimulationMetadata, load_metadata};
use crate::report::{ImportReport, SkipReason};
use crate::results::{GraphNodeDescriptor, ResultsContainer, SUMMARY_CONTAINER_KEY};
use crate::rki::check_data_dir;
use crate::{ImportError, ImportResult};

/// What to do when the imported simulation key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Delete the existing simulation and all its data, then reimport.
    Replace,
    /// Keep existing data and add the new rows.
    Append,
}

/// Import a simulation results folder: one sub-directory per
/// percentile, each holding `Results.json`, `Results_sum.json`, and
/// per-node `GraphNode*` descriptors.
///
/// An existing simulation with the same key requires an explicit
/// [`ConflictPolicy`]; with none supplied the import fails before any
/// write so an operator can decide.
pub fn import_simulation(
    store: &DataStore,
    config: &EngineConfig,
    path: &Path,
    policy: Option<ConflictPolicy>,
) -> ImportResult<ImportReport> {
    check_data_dir(path)?;

    let meta: SimulationMetadata = load_metadata(path, SIMULATION_MANDATORY)?;
    let start_day = parse_day(&meta.start_day)?;

    let scenario = store
        .load_scenario(&meta.scenario)
        .map_err(|_| ImportError::ScenarioNotFound {
            key: meta.scenario.clone(),
        })?;
    let model =
        store
            .model(&scenario.simulation_model)
            .ok_or_else(|| ImportError::ModelNotFound {
                key: scenario.simulation_model.clone(),
            })?;

    // Every model compartment must have a column; membership is checked
    // here, at write time, rather than trusting the open mapping.
    for compartment in &model.compartments {
        if !meta.compartment_order.contains(&compartment.key) {
            return Err(ImportError::CompartmentNotInOrder {
                compartment: compartment.key.clone(),
                model: model.key.clone(),
            });
        }
    }
    let model_compartments: HashSet<&str> =
        model.compartments.iter().map(|c| c.key.as_str()).collect();
    for column in &meta.compartment_order {
        if column != IGNORE_COLUMN && !model_compartments.contains(column.as_str()) {
            return Err(ImportError::CompartmentNotInOrder {
                compartment: column.clone(),
                model: model.key.clone(),
            });
        }
    }

    // Percentile folders, before any write.
    let mut percentiles = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.path().is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            percentiles.push((parse_percentile_dir(&name)?, entry.path()));
        }
    }
    if percentiles.is_empty() {
        return Err(ImportError::NoPercentiles);
    }
    percentiles.sort_by_key(|(p, _)| *p);

    match (store.has_simulation(&meta.key), policy) {
        (true, None) => {
            return Err(ImportError::SimulationExists {
                key: meta.key.clone(),
            });
        }
        (true, Some(ConflictPolicy::Replace)) => {
            info!(simulation = %meta.key, "replacing existing simulation");
            store.delete_simulation(&meta.key)?;
        }
        (true, Some(ConflictPolicy::Append)) => {
            info!(simulation = %meta.key, "appending to existing simulation");
        }
        (false, _) => {}
    }

    if !store.has_simulation(&meta.key) {
        store.create_simulation(&Simulation {
            key: meta.key.clone(),
            name: meta.name.clone(),
            description: meta.description.clone(),
            scenario: scenario.key.clone(),
            start_day,
            number_of_days: meta.number_of_days,
        })?;
    }

    let scenario_nodes: HashSet<&str> = scenario.nodes.iter().map(|n| n.node.as_str()).collect();
    let mut report = ImportReport::default();

    for (percentile, folder) in &percentiles {
        info!(percentile, folder = %folder.display(), "processing percentile");
        let percentile_report = process_percentile(
            store,
            config,
            &meta,
            start_day,
            *percentile,
            folder,
            &scenario_nodes,
        )?;
        report.merge(percentile_report);
    }

    info!(
        simulation = %meta.key,
        nodes = report.nodes_imported,
        entries = report.entries_created,
        skips = report.skips.len(),
        "simulation import finished"
    );
    Ok(report)
}

fn process_percentile(
    store: &DataStore,
    config: &EngineConfig,
    meta: &SimulationMetadata,
    start_day: chrono::NaiveDate,
    percentile: i32,
    folder: &Path,
    scenario_nodes: &HashSet<&str>,
) -> ImportResult<ImportReport> {
    let results = ResultsContainer::load(folder, "Results.json")?;
    let summary = ResultsContainer::load(folder, "Results_sum.json")?;

    let spec = DatasetSpec {
        datasets: &meta.datasets,
        order: &meta.compartment_order,
        group_mapping: meta.group_mapping.as_ref(),
        start_day,
        percentile,
        // row 0 carries the seed state
        expected_rows: Some(1 + meta.number_of_days as usize),
        skip_seed_row: true,
    };

    let mut report = ImportReport::default();
    let mut rows = Vec::new();

    // Node identity comes from the GraphNode descriptor files, not from
    // the container's own grouping.
    let mut descriptors = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("GraphNode") {
            descriptors.push(entry.path());
        }
    }
    descriptors.sort();

    for descriptor_path in &descriptors {
        let descriptor = GraphNodeDescriptor::load(descriptor_path)?;
        let raw_id = descriptor.node_id_str();
        let padded = canonical_node_key(&raw_id, config.node_key_width);

        if !scenario_nodes.contains(padded.as_str()) {
            report.skip(&padded, SkipReason::NodeNotInScenario {
                scenario: meta.scenario.clone(),
            });
            continue;
        }

        let Some(node) = store.reference().node(&padded) else {
            report.skip(&padded, SkipReason::UnknownNode);
            continue;
        };

        let Some(datasets) = results.node(&raw_id) else {
            report.skip(&padded, SkipReason::NoDataForNode);
            continue;
        };

        if collect_node_rows(store, node, datasets, &spec, &mut rows, &mut report) {
            report.nodes_imported += 1;
        }
    }

    // The aggregate container last, as pseudo-node 00000.
    if let Some(datasets) = summary.node(SUMMARY_CONTAINER_KEY) {
        if !scenario_nodes.contains(SUMMARY_NODE_KEY) {
            report.skip(SUMMARY_NODE_KEY, SkipReason::NodeNotInScenario {
                scenario: meta.scenario.clone(),
            });
        } else {
            match store.reference().node(SUMMARY_NODE_KEY) {
                Some(node) => {
                    if collect_node_rows(store, node, datasets, &spec, &mut rows, &mut report) {
                        report.nodes_imported += 1;
                    }
                }
                None => report.skip(SUMMARY_NODE_KEY, SkipReason::UnknownNode),
            }
        }
    }

    store.append_simulation_rows(&meta.key, &rows)?;
    Ok(report)
}
