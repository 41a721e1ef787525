//! Engine configuration.
//!
//! One explicit struct handed to the import and query engines at
//! construction. Every recognized knob is enumerated here.

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Width node keys are zero-padded to (German county keys are 5 digits).
    pub node_key_width: usize,
    /// Percentile selected when a query does not name one; reference
    /// imports also tag their entries with this value.
    pub default_percentile: i32,
    /// Upper bound on rows an unpaginated (`all`) query may return.
    pub max_unpaginated_rows: usize,
    /// Page size used when a paginated query does not name one.
    pub default_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_key_width: 5,
            default_percentile: 50,
            max_unpaginated_rows: 100_000,
            default_page_size: 100,
        }
    }
}
