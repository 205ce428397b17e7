use chrono::{Datelike, NaiveDate};

use super::{Error, Result};

/// The default date format, month-day-year (e.g. `Mar-01-2017`).
pub const DATE_FORMAT: &str = "%b-%d-%Y";

/// Parse a formatted date string into its proleptic Gregorian ordinal day
/// number (day 1 is January 1 of year 1).
pub fn datenum(date_str: &str, format: &str) -> Result<isize> {
    let date = NaiveDate::parse_from_str(date_str, format).map_err(Error::msg)?;
    Ok(date.num_days_from_ce() as isize)
}

/// Render an ordinal day number as a formatted date string.
pub fn datestr(date_num: isize, format: &str) -> Result<String> {
    let date = i32::try_from(date_num)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| Error::msg(format!("day number {} is out of range", date_num)))?;

    Ok(date.format(format).to_string())
}
