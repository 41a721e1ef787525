//! epi-query: filtering, aggregation, and pagination over flattened
//! data rows.
//!
//! The engine is pure: it takes rows the store loaded and a parsed
//! [`FilterContext`], and never touches the filesystem. Client-supplied
//! parameters that fail to parse are [`QueryError`]s; an empty result
//! set is not.

pub mod aggregate;
pub mod filter;
pub mod paginate;

pub use aggregate::{AggregateKey, SeriesRecord, aggregate_by, sort_records};
pub use filter::{FilterContext, FilterParams, GroupFilter, GroupParams};
pub use paginate::{Page, Pagination, paginate};

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("Invalid value '{value}' for parameter '{field}'")]
    InvalidParameter { field: &'static str, value: String },

    #[error("Aggregation input is not sorted by {key}")]
    UnsortedInput { key: &'static str },

    #[error("Unpaginated result of {actual} rows exceeds the limit of {limit}")]
    TooManyRows { actual: usize, limit: usize },

    #[error("Core error: {0}")]
    Core(#[from] epi_core::CoreError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
