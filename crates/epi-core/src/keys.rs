//! Canonical node keys and percentile folder names.

use crate::{CoreError, CoreResult};

/// Pseudo-node carrying the aggregate over all geographic nodes.
pub const SUMMARY_NODE_KEY: &str = "00000";

/// Zero-pad a raw node identifier to the canonical key width.
///
/// Identifiers already at or beyond the width are returned unchanged,
/// matching the left-fill semantics the result files assume.
pub fn canonical_node_key(raw: &str, width: usize) -> String {
    if raw.len() >= width {
        return raw.to_string();
    }
    let mut key = String::with_capacity(width);
    for _ in 0..width - raw.len() {
        key.push('0');
    }
    key.push_str(raw);
    key
}

/// Parse a percentile folder name into its integer percentile.
///
/// Folder names are either purely numeric (`25`) or carry a single
/// non-numeric marker prefix (`p25`); anything else is rejected.
pub fn parse_percentile_dir(name: &str) -> CoreResult<i32> {
    let invalid = || CoreError::InvalidPercentile {
        name: name.to_string(),
    };

    if name.is_empty() {
        return Err(invalid());
    }

    if name.chars().all(|c| c.is_ascii_digit()) {
        return name.parse().map_err(|_| invalid());
    }

    let stripped = &name[name.chars().next().map(char::len_utf8).unwrap_or(1)..];
    if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
        return stripped.parse().map_err(|_| invalid());
    }

    Err(invalid())
}
