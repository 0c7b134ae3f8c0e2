use crate::error::{FundReportError, Result};
use crate::schema::Report;
use crate::utils::{format_date, format_thousands};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Renders the fixed-template text report.
///
/// Output depends only on the report's fields, so identical input always yields
/// identical text.
pub fn render_report(report: &Report) -> String {
    let money = |v: f64| format!("{} VND", format_thousands(v));

    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write!(
        out,
        "
Investment Growth Report
=======================

Period: {start} to {end}
Duration: {days} days

Initial Investment: {initial_value}
Final Value: {final_value}
Total Growth: {growth:.2}%
Annualized Return: {annualized:.2}%

Key Statistics:
-------------
Highest Value: {highest}
Lowest Value: {lowest}
Average Value: {average}

Number of Units:
---------------
Initial Units: {initial_units}
Final Units: {final_units}
Unit Change: {unit_change}

Price Analysis:
-------------
Initial Price: {initial_price}
Final Price: {final_price}
Price Change: {price_change:.2}%

Return Analysis:
--------------
Best Monthly Return: {best:.2}%
Worst Monthly Return: {worst:.2}%
Average Monthly Return: {avg_monthly:.2}%

Investment Strategy Analysis:
--------------------------
Total Units Acquired: {acquired}
Average Unit Price: {avg_price}
Price Volatility: {volatility}
Total Capital Invested: {capital}
Return on Capital: {roc:.2}%
",
        start = format_date(report.period_start),
        end = format_date(report.period_end),
        days = report.duration_days,
        initial_value = money(report.initial_value as f64),
        final_value = money(report.final_value as f64),
        growth = report.total_growth_pct,
        annualized = report.annualized_return_pct,
        highest = money(report.highest_value as f64),
        lowest = money(report.lowest_value as f64),
        average = money(report.average_value),
        initial_units = format_thousands(report.initial_units as f64),
        final_units = format_thousands(report.final_units as f64),
        unit_change = format_thousands(report.unit_change as f64),
        initial_price = money(report.initial_price as f64),
        final_price = money(report.final_price as f64),
        price_change = report.price_change_pct,
        best = report.best_monthly_return_pct,
        worst = report.worst_monthly_return_pct,
        avg_monthly = report.average_monthly_return_pct,
        acquired = format_thousands(report.total_units_acquired as f64),
        avg_price = money(report.average_unit_price),
        volatility = money(report.price_volatility),
        capital = money(report.total_capital_invested as f64),
        roc = report.final_return_on_capital_pct,
    );
    out
}

/// Writes `contents` to a sibling temp file, then renames it over `path`.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FundReportError::io(parent, e))?;
    }

    let tmp = temp_sibling(path);
    fs::write(&tmp, contents).map_err(|e| FundReportError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        FundReportError::io(path, e)
    })
}

pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    write_atomically(path, render_report(report).as_bytes())
}
