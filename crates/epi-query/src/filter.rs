//! Raw query parameters and their parsed filter context.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use regex::Regex;

use epi_core::{EngineConfig, parse_day};
use epi_store::DataRow;

use crate::paginate::Pagination;
use crate::{QueryError, QueryResult};

/// Group selection as the caller sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupParams {
    /// Flat list of group names, OR-combined.
    Flat(Vec<String>),
    /// Category → names; categories are AND-combined, names within one
    /// category OR-combined.
    ByCategory(BTreeMap<String, Vec<String>>),
}

/// Untyped query parameters, exactly as an outer surface would receive
/// them. Everything is optional; parsing happens in
/// [`FilterContext::new`].
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    /// Single day, `YYYY-MM-DD`. Overrides `from` and `to`.
    pub day: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub nodes: Option<Vec<String>>,
    pub compartments: Option<Vec<String>>,
    pub groups: Option<GroupParams>,
    pub percentile: Option<String>,
    /// Bypass pagination (bounded by the engine config).
    pub all: bool,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Compiled group predicate.
#[derive(Debug, Clone)]
pub enum GroupFilter {
    Flat(Vec<Regex>),
    ByCategory(Vec<Vec<Regex>>),
}

impl GroupFilter {
    /// Match against a row's comma-joined group names.
    pub fn matches(&self, groups: &str) -> bool {
        match self {
            GroupFilter::Flat(patterns) => patterns.iter().any(|p| p.is_match(groups)),
            GroupFilter::ByCategory(categories) => categories
                .iter()
                .all(|patterns| patterns.iter().any(|p| p.is_match(groups))),
        }
    }
}

/// Whole-token match of one group name inside a comma-joined list.
fn group_regex(name: &str) -> QueryResult<Regex> {
    Ok(Regex::new(&format!(
        "^([^,]*,)*{}(,[^,]*)*$",
        regex::escape(name)
    ))?)
}

/// Parsed filter: what [`FilterParams`] means once every string has
/// been checked.
#[derive(Debug, Clone)]
pub struct FilterContext {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub nodes: Option<HashSet<String>>,
    pub compartments: Option<Vec<String>>,
    pub groups: Option<GroupFilter>,
    pub percentile: i32,
    pub pagination: Pagination,
}

impl FilterContext {
    pub fn new(params: &FilterParams, config: &EngineConfig) -> QueryResult<Self> {
        // a single day narrows both bounds, whatever from/to say
        let (from, to) = match &params.day {
            Some(day) => {
                let day = parse_day(day)?;
                (Some(day), Some(day))
            }
            None => (
                params.from.as_deref().map(parse_day).transpose()?,
                params.to.as_deref().map(parse_day).transpose()?,
            ),
        };

        let percentile = match &params.percentile {
            Some(raw) => raw
                .parse()
                .map_err(|_| QueryError::InvalidParameter {
                    field: "percentile",
                    value: raw.clone(),
                })?,
            None => config.default_percentile,
        };

        let groups = match &params.groups {
            Some(GroupParams::Flat(names)) => {
                let patterns = names
                    .iter()
                    .map(|n| group_regex(n))
                    .collect::<QueryResult<Vec<_>>>()?;
                Some(GroupFilter::Flat(patterns))
            }
            Some(GroupParams::ByCategory(by_category)) => {
                let categories = by_category
                    .values()
                    .map(|names| {
                        names
                            .iter()
                            .map(|n| group_regex(n))
                            .collect::<QueryResult<Vec<_>>>()
                    })
                    .collect::<QueryResult<Vec<_>>>()?;
                Some(GroupFilter::ByCategory(categories))
            }
            None => None,
        };

        let pagination = if params.all {
            Pagination::All
        } else {
            Pagination::Page {
                page: params.page.unwrap_or(1),
                page_size: params.page_size.unwrap_or(config.default_page_size),
            }
        };

        Ok(FilterContext {
            from,
            to,
            nodes: params
                .nodes
                .as_ref()
                .map(|keys| keys.iter().cloned().collect()),
            compartments: params.compartments.clone(),
            groups,
            percentile,
            pagination,
        })
    }

    /// Day, node, percentile, and group predicates. Compartment
    /// subsetting happens at serialization, not here.
    pub fn matches(&self, row: &DataRow) -> bool {
        if let Some(from) = self.from
            && row.day < from
        {
            return false;
        }
        if let Some(to) = self.to
            && row.day > to
        {
            return false;
        }
        if let Some(nodes) = &self.nodes
            && !nodes.contains(&row.node_key)
        {
            return false;
        }
        if row.percentile != self.percentile {
            return false;
        }
        if let Some(groups) = &self.groups
            && !groups.matches(&row.groups)
        {
            return false;
        }
        true
    }
}
