use crate::error::{FundReportError, Result};
use crate::schema::{Observation, RawRecord};
use chrono::NaiveDate;
use log::debug;

pub const DATE_FORMAT: &str = "%d/%m/%Y";
const THOUSANDS_SEPARATOR: char = ',';

/// Parses a `DD/MM/YYYY` date.
pub fn parse_date(text: &str, line: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| {
        FundReportError::FormatError {
            field: "date",
            value: text.to_string(),
            line,
        }
    })
}

/// Parses a non-negative integer written with `,` thousands grouping.
pub fn parse_grouped_integer(text: &str, field: &'static str, line: usize) -> Result<u64> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != THOUSANDS_SEPARATOR)
        .collect();

    digits.parse::<u64>().map_err(|_| FundReportError::FormatError {
        field,
        value: text.to_string(),
        line,
    })
}

/// Parses a percentage such as `-1.25%` into `-1.25`.
pub fn parse_ratio(text: &str, line: usize) -> Result<f64> {
    let number = text.trim().trim_end_matches('%').trim();

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FundReportError::FormatError {
            field: "profit ratio",
            value: text.to_string(),
            line,
        }),
    }
}

pub fn normalize_record(raw: &RawRecord) -> Result<Observation> {
    Ok(Observation {
        date: parse_date(&raw.date, raw.line)?,
        unit_price: parse_grouped_integer(&raw.unit_price, "unit price", raw.line)?,
        units_held: parse_grouped_integer(&raw.units_held, "units held", raw.line)?,
        asset_value: parse_grouped_integer(&raw.asset_value, "asset value", raw.line)?,
        stated_return_pct: parse_ratio(&raw.profit_ratio, raw.line)?,
    })
}

/// Converts every record and sorts the result by date.
///
/// The first unconvertible field aborts the whole batch. The sort is stable, so
/// records sharing a date keep their file order.
pub fn normalize_records(records: &[RawRecord]) -> Result<Vec<Observation>> {
    let mut observations = records
        .iter()
        .map(normalize_record)
        .collect::<Result<Vec<_>>>()?;

    observations.sort_by_key(|o| o.date);

    debug!("Normalized {} observation(s)", observations.len());

    Ok(observations)
}
