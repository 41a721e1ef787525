//! Turning one dataset matrix into data entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use epi_core::day_offset;
use epi_model::DataEntry;

use crate::metadata::IGNORE_COLUMN;

/// Build one [`DataEntry`] per day row of a dataset.
///
/// `order` names the dataset's columns; `**ignore**` columns are
/// omitted from the entry. With `skip_seed_row` set (simulation
/// imports) row 0 carries the seed state and is discarded, so the first
/// materialized entry is dated `start_day + 1`; reference imports keep
/// row 0 at `start_day`.
pub fn build_data_entries(
    start_day: NaiveDate,
    dataset: &[Vec<f64>],
    order: &[String],
    group: &str,
    percentile: i32,
    skip_seed_row: bool,
) -> Vec<DataEntry> {
    let first_row = usize::from(skip_seed_row);
    let mut entries = Vec::with_capacity(dataset.len().saturating_sub(first_row));

    for (day, row) in dataset.iter().enumerate().skip(first_row) {
        let mut data = BTreeMap::new();
        for (index, compartment) in order.iter().enumerate() {
            if compartment == IGNORE_COLUMN {
                continue;
            }
            data.insert(compartment.clone(), row[index]);
        }

        entries.push(DataEntry {
            day: day_offset(start_day, day as u64),
            percentile,
            groups: vec![group.to_string()],
            data,
        });
    }

    entries
}
