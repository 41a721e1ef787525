//! Shared application service layer.
//!
//! This crate provides a unified interface for frontends, centralizing
//! catalog access, scenario and simulation management, imports, and the
//! series endpoints over one [`epi_store::DataStore`].

pub mod catalog;
pub mod error;
pub mod import_service;
pub mod scenario_service;
pub mod series;
pub mod simulation_service;

// Re-export key types for convenience
pub use catalog::{
    ModelSummary, get_model_detail, get_model_summary, list_compartments, list_group_categories,
    list_groups, list_models, list_nodes, list_parameters, list_restrictions,
};
pub use epi_query::{FilterParams, GroupParams, Page, SeriesRecord};
pub use error::{AppError, AppResult};
pub use import_service::{
    ConflictPolicy, ImportReport, import_rki, import_scenario, import_simulation,
};
pub use scenario_service::{
    ScenarioSummary, delete_scenario, get_scenario_detail, list_scenario_summaries,
};
pub use series::{
    rki_series_by_day, rki_series_by_node, simulation_series_by_day, simulation_series_by_node,
};
pub use simulation_service::{delete_simulation, get_simulation, list_simulation_summaries};
