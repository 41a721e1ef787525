//! Error types for the epi-app service layer.

/// Application error type that wraps errors from the backend crates and
/// provides a unified interface for any frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Simulation not found: {0}")]
    SimulationNotFound(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Simulation '{0}' already exists; choose replace or append")]
    SimulationExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for epi-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types. Not-found and conflict cases
// keep their identity so frontends can react to them.
impl From<epi_store::StoreError> for AppError {
    fn from(err: epi_store::StoreError) -> Self {
        match err {
            epi_store::StoreError::ScenarioNotFound { key } => AppError::ScenarioNotFound(key),
            epi_store::StoreError::SimulationNotFound { key } => AppError::SimulationNotFound(key),
            other => AppError::Store(other.to_string()),
        }
    }
}

impl From<epi_import::ImportError> for AppError {
    fn from(err: epi_import::ImportError) -> Self {
        match err {
            epi_import::ImportError::SimulationExists { key } => AppError::SimulationExists(key),
            epi_import::ImportError::ScenarioNotFound { key } => AppError::ScenarioNotFound(key),
            epi_import::ImportError::ModelNotFound { key } => AppError::ModelNotFound(key),
            other => AppError::Import(other.to_string()),
        }
    }
}

impl From<epi_query::QueryError> for AppError {
    fn from(err: epi_query::QueryError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<epi_core::CoreError> for AppError {
    fn from(err: epi_core::CoreError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
