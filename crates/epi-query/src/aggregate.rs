//! Series records and key-wise aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use epi_store::DataRow;

use crate::{QueryError, QueryResult};

/// One serialized series point: a display name, a day, and the
/// compartment values kept after subsetting.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesRecord {
    pub name: String,
    pub day: NaiveDate,
    pub compartments: BTreeMap<String, f64>,
}

impl SeriesRecord {
    /// Project a row, keeping only the requested compartments (all of
    /// them when no subset is given). Requested compartments a row
    /// lacks are simply absent.
    pub fn from_row(row: &DataRow, compartments: Option<&[String]>) -> Self {
        let compartments = match compartments {
            Some(subset) => subset
                .iter()
                .filter_map(|key| row.data.get(key).map(|v| (key.clone(), *v)))
                .collect(),
            None => row.data.clone(),
        };

        SeriesRecord {
            name: row.node_name.clone(),
            day: row.day,
            compartments,
        }
    }
}

/// Which field consecutive records are grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKey {
    Day,
    Name,
}

impl AggregateKey {
    fn field(self) -> &'static str {
        match self {
            AggregateKey::Day => "day",
            AggregateKey::Name => "name",
        }
    }

    fn eq(self, a: &SeriesRecord, b: &SeriesRecord) -> bool {
        match self {
            AggregateKey::Day => a.day == b.day,
            AggregateKey::Name => a.name == b.name,
        }
    }

    fn le(self, a: &SeriesRecord, b: &SeriesRecord) -> bool {
        match self {
            AggregateKey::Day => a.day <= b.day,
            AggregateKey::Name => a.name <= b.name,
        }
    }
}

/// Sort records so [`aggregate_by`] sees its key in runs.
pub fn sort_records(records: &mut [SeriesRecord], key: AggregateKey) {
    match key {
        AggregateKey::Day => records.sort_by(|a, b| a.day.cmp(&b.day).then(a.name.cmp(&b.name))),
        AggregateKey::Name => records.sort_by(|a, b| a.name.cmp(&b.name).then(a.day.cmp(&b.day))),
    }
}

/// Collapse runs of equal-key records into one record each: the first
/// member's metadata and the key-wise sum of all members' compartments.
///
/// The input must already be sorted on the key; an out-of-order record
/// would silently fold into the wrong output, so it is an error
/// instead.
pub fn aggregate_by(
    records: Vec<SeriesRecord>,
    key: AggregateKey,
) -> QueryResult<Vec<SeriesRecord>> {
    let mut output: Vec<SeriesRecord> = Vec::new();

    for record in records {
        match output.last_mut() {
            Some(current) if key.eq(current, &record) => {
                for (compartment, value) in record.compartments {
                    *current.compartments.entry(compartment).or_insert(0.0) += value;
                }
            }
            Some(current) if !key.le(current, &record) => {
                return Err(QueryError::UnsortedInput { key: key.field() });
            }
            _ => output.push(record),
        }
    }

    Ok(output)
}
