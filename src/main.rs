//! `fund-report` — builds the investment growth report from extracted statement text.
//!
//! Settings come from an optional JSON config file; any flag given on the
//! command line overrides the file.

use anyhow::{Context, Result};
use clap::Parser;
use fund_growth_report::{FundReportProcessor, PipelineConfig};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fund-report",
    about = "Analyze fund-unit valuation records and write a growth report and chart"
)]
struct Cli {
    /// JSON file with pipeline settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extracted text to analyze. Defaults to extracted_text.csv.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the text report. Defaults to investment_report.txt.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Where to write the PNG chart. Defaults to investment_growth.png.
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Skip rendering the chart.
    #[arg(long, default_value_t = false)]
    no_chart: bool,

    /// Also export the enriched ledger as CSV.
    #[arg(long)]
    ledger_csv: Option<PathBuf>,

    /// Also export the report as JSON.
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Text that opens each header line.
    #[arg(long)]
    header_marker: Option<String>,

    /// Separator between columns on a data line.
    #[arg(long)]
    delimiter: Option<String>,

    /// Trailing window length for the outlier filter.
    #[arg(long)]
    outlier_window: Option<usize>,

    /// Drop values above this multiple of the trailing mean.
    #[arg(long)]
    outlier_multiplier: Option<f64>,

    /// Fail on malformed blocks instead of skipping them.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(report) = self.report {
            config.report_path = report;
        }
        if let Some(chart) = self.chart {
            config.chart_path = Some(chart);
        }
        if self.no_chart {
            config.chart_path = None;
        }
        if let Some(path) = self.ledger_csv {
            config.ledger_csv_path = Some(path);
        }
        if let Some(path) = self.report_json {
            config.report_json_path = Some(path);
        }
        if let Some(marker) = self.header_marker {
            config.header_marker = marker;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(window) = self.outlier_window {
            config.outlier_window = window;
        }
        if let Some(multiplier) = self.outlier_multiplier {
            config.outlier_multiplier = multiplier;
        }
        if self.strict {
            config.strict = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config()?;
    let output = FundReportProcessor::run(&config).context("report generation failed")?;

    info!(
        "Done: {} to {}, total growth {:.2}%",
        output.report.period_start.format("%d/%m/%Y"),
        output.report.period_end.format("%d/%m/%Y"),
        output.report.total_growth_pct
    );
    println!(
        "\nReport generated! Check '{}' for details.",
        config.report_path.display()
    );

    Ok(())
}
