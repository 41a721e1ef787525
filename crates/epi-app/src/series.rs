//! Series endpoints: filtered, ordered, aggregated, paginated views of
//! simulation and reference rows.

use epi_core::EngineConfig;
use epi_query::{
    AggregateKey, FilterContext, FilterParams, Page, SeriesRecord, aggregate_by, paginate,
    sort_records,
};
use epi_store::{DataRow, DataStore};

use crate::error::{AppError, AppResult};

/// Time series for one node of a simulation, one record per day,
/// ascending. Rows sharing a day (one per group slice) are summed.
pub fn simulation_series_by_node(
    store: &DataStore,
    config: &EngineConfig,
    simulation: &str,
    node: &str,
    params: &FilterParams,
) -> AppResult<Page<SeriesRecord>> {
    store.load_simulation(simulation)?;
    require_node(store, node)?;

    let rows = store.load_simulation_rows(simulation)?;
    run_series(rows, config, restrict_to_node(params, node), AggregateKey::Day)
}

/// Cross-section of a simulation for the filtered day range, one record
/// per node, ascending by node name. Rows of the same node are summed.
pub fn simulation_series_by_day(
    store: &DataStore,
    config: &EngineConfig,
    simulation: &str,
    params: &FilterParams,
) -> AppResult<Page<SeriesRecord>> {
    store.load_simulation(simulation)?;

    let rows = store.load_simulation_rows(simulation)?;
    run_series(rows, config, params.clone(), AggregateKey::Name)
}

/// Reference data series for one node, one record per day, ascending.
pub fn rki_series_by_node(
    store: &DataStore,
    config: &EngineConfig,
    node: &str,
    params: &FilterParams,
) -> AppResult<Page<SeriesRecord>> {
    require_node(store, node)?;

    let rows = store.load_rki_rows()?;
    run_series(rows, config, restrict_to_node(params, node), AggregateKey::Day)
}

/// Reference data cross-section, one record per node, ascending by
/// node name.
pub fn rki_series_by_day(
    store: &DataStore,
    config: &EngineConfig,
    params: &FilterParams,
) -> AppResult<Page<SeriesRecord>> {
    let rows = store.load_rki_rows()?;
    run_series(rows, config, params.clone(), AggregateKey::Name)
}

fn run_series(
    rows: Vec<DataRow>,
    config: &EngineConfig,
    params: FilterParams,
    key: AggregateKey,
) -> AppResult<Page<SeriesRecord>> {
    let context = FilterContext::new(&params, config)?;

    let mut records: Vec<SeriesRecord> = rows
        .iter()
        .filter(|row| context.matches(row))
        .map(|row| SeriesRecord::from_row(row, context.compartments.as_deref()))
        .collect();

    sort_records(&mut records, key);
    let aggregated = aggregate_by(records, key)?;

    Ok(paginate(
        aggregated,
        context.pagination,
        config.max_unpaginated_rows,
    )?)
}

fn restrict_to_node(params: &FilterParams, node: &str) -> FilterParams {
    FilterParams {
        nodes: Some(vec![node.to_string()]),
        ..params.clone()
    }
}

fn require_node(store: &DataStore, node: &str) -> AppResult<()> {
    if store.reference().node(node).is_none() {
        return Err(AppError::NodeNotFound(node.to_string()));
    }
    Ok(())
}
