use crate::error::{FundReportError, Result};
use crate::report::write_atomically;
use crate::schema::{EnrichedObservation, Report};
use crate::utils::format_date;
use std::path::Path;

const LEDGER_HEADER: [&str; 9] = [
    "date",
    "unit_price",
    "units_held",
    "asset_value",
    "stated_return_pct",
    "unit_delta",
    "capital_added",
    "cumulative_capital",
    "return_on_capital_pct",
];

/// Serializes the enriched ledger as CSV; undefined return on capital is left empty.
pub fn ledger_to_csv(observations: &[EnrichedObservation]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(LEDGER_HEADER)?;

    for o in observations {
        writer.write_record([
            format_date(o.date()),
            o.observation.unit_price.to_string(),
            o.observation.units_held.to_string(),
            o.observation.asset_value.to_string(),
            format!("{:.2}", o.observation.stated_return_pct),
            o.unit_delta.to_string(),
            o.capital_added.to_string(),
            o.cumulative_capital.to_string(),
            o.return_on_capital_pct
                .map(|roc| format!("{:.2}", roc))
                .unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| FundReportError::Csv(e.into_error().into()))
}

pub fn export_ledger_csv(observations: &[EnrichedObservation], path: &Path) -> Result<()> {
    write_atomically(path, &ledger_to_csv(observations)?)
}

pub fn export_report_json(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(report)?;
    write_atomically(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capital::track_capital;
    use crate::schema::Observation;
    use chrono::NaiveDate;

    #[test]
    fn test_ledger_csv_rows() {
        let ledger = track_capital(&[
            Observation {
                date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                unit_price: 10_000,
                units_held: 100,
                asset_value: 1_000_000,
                stated_return_pct: 0.0,
            },
            Observation {
                date: NaiveDate::from_ymd_opt(2022, 1, 2).unwrap(),
                unit_price: 10_500,
                units_held: 110,
                asset_value: 1_160_000,
                stated_return_pct: 1.0,
            },
        ])
        .unwrap();

        let bytes = ledger_to_csv(&ledger.observations).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,unit_price"));
        assert_eq!(lines[1], "01/01/2022,10000,100,1000000,0.00,0,0,0,");
        assert_eq!(
            lines[2],
            "02/01/2022,10500,110,1160000,1.00,10,105000,105000,1004.76"
        );
    }
}
