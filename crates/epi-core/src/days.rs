//! Day parsing and arithmetic.

use chrono::{Days, NaiveDate};

use crate::{CoreError, CoreResult};

/// Parse an ISO `YYYY-MM-DD` day string.
pub fn parse_day(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CoreError::InvalidDay {
        value: value.to_string(),
    })
}

/// The day `offset` days after `start`.
pub fn day_offset(start: NaiveDate, offset: u64) -> NaiveDate {
    start
        .checked_add_days(Days::new(offset))
        .unwrap_or(NaiveDate::MAX)
}
