//! epi-core: stable foundation for the episcope data platform.
//!
//! Contains:
//! - config (explicit engine configuration, no global settings object)
//! - keys (canonical node-key padding, percentile folder parsing)
//! - days (ISO day parsing and offset helpers)
//! - error (shared error types)

pub mod config;
pub mod days;
pub mod keys;

pub use config::EngineConfig;
pub use days::{day_offset, parse_day};
pub use keys::{SUMMARY_NODE_KEY, canonical_node_key, parse_percentile_dir};

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("Invalid day '{value}': expected YYYY-MM-DD")]
    InvalidDay { value: String },

    #[error("Invalid percentile folder name '{name}'")]
    InvalidPercentile { name: String },
}
