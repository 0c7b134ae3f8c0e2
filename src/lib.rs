//! # Fund Growth Report
//!
//! Turns the loosely formatted text extracted from fund statements into an
//! investment-performance report.
//!
//! ## Pipeline
//!
//! 1. **Parse** ([`ingestion`]): header/data line blocks become [`RawRecord`]s.
//! 2. **Normalize** ([`cleaner`]): `,`-grouped numbers, `%` ratios and
//!    `DD/MM/YYYY` dates become typed [`Observation`]s, sorted by date.
//! 3. **Filter** ([`outliers`]): values spiking above twice the trailing
//!    7-record mean are dropped.
//! 4. **Track capital** ([`capital`]): unit-count deltas rebuild the cumulative
//!    invested capital and return on capital per record.
//! 5. **Measure** ([`metrics`]): growth, annualized return, monthly returns and
//!    summary statistics are collected into a [`Report`].
//! 6. **Render** ([`report`], [`chart`]): fixed-template text plus a PNG chart.
//!
//! Each stage takes the previous stage's full output and returns a new
//! collection; nothing is mutated in place.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fund_growth_report::*;
//!
//! let text = std::fs::read_to_string("extracted_text.csv")?;
//! let output = FundReportProcessor::process(&text, &PipelineConfig::default())?;
//! println!("{}", render_report(&output.report));
//! ```

pub mod capital;
pub mod chart;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod metrics;
pub mod outliers;
pub mod report;
pub mod schema;
pub mod utils;

pub use capital::{return_on_capital, track_capital, CapitalLedger};
pub use chart::{render_chart, ReturnSeries};
pub use cleaner::normalize_records;
pub use config::PipelineConfig;
pub use error::{FundReportError, Result};
pub use export::{export_ledger_csv, export_report_json};
pub use ingestion::{parse_records, ParseOutcome, RecordParser};
pub use metrics::{monthly_buckets, MetricsEngine};
pub use outliers::{FilterOutcome, OutlierFilter};
pub use report::{render_report, write_report};
pub use schema::*;

use log::{debug, info};

/// Every intermediate collection of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub raw_records: Vec<RawRecord>,
    pub skipped_blocks: Vec<SkippedBlock>,
    pub observations: Vec<Observation>,
    pub filtered: Vec<Observation>,
    pub dropped_outliers: Vec<DroppedOutlier>,
    pub enriched: Vec<EnrichedObservation>,
    pub investment_events: Vec<InvestmentEvent>,
    pub monthly_buckets: Vec<MonthlyBucket>,
    pub report: Report,
}

pub struct FundReportProcessor;

impl FundReportProcessor {
    /// Runs parse through metrics on in-memory text. Touches no files.
    pub fn process(text: &str, config: &PipelineConfig) -> Result<PipelineOutput> {
        config.validate()?;

        let parsed = parse_records(text, &config.header_marker, &config.delimiter, config.strict)?;
        info!(
            "Parsed {} record(s) ({} skipped)",
            parsed.records.len(),
            parsed.skipped.len()
        );

        let observations = normalize_records(&parsed.records)?;

        let filtered = OutlierFilter::new(config.outlier_window, config.outlier_multiplier)
            .apply(&observations);
        info!(
            "{} observation(s) after outlier filtering ({} dropped)",
            filtered.retained.len(),
            filtered.dropped.len()
        );
        if filtered.retained.len() < 2 {
            return Err(FundReportError::InsufficientData {
                found: filtered.retained.len(),
            });
        }

        let ledger = track_capital(&filtered.retained)?;
        info!(
            "Found {} investment event(s), total capital {} VND",
            ledger.events.len(),
            ledger
                .observations
                .last()
                .map(|o| o.cumulative_capital)
                .unwrap_or(0)
        );

        let buckets = monthly_buckets(&ledger.observations);
        let report = MetricsEngine::build_report(&ledger.observations, &buckets)?;
        debug!("Metrics computed for {} month(s)", buckets.len());

        Ok(PipelineOutput {
            raw_records: parsed.records,
            skipped_blocks: parsed.skipped,
            observations,
            filtered: filtered.retained,
            dropped_outliers: filtered.dropped,
            enriched: ledger.observations,
            investment_events: ledger.events,
            monthly_buckets: buckets,
            report,
        })
    }

    /// Reads the input file, runs [`process`](Self::process) and writes the artifacts.
    ///
    /// Nothing is written unless every metric computed, and the report text is
    /// written before the optional chart and exports.
    pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
        info!("Reading records from {}", config.input_path.display());
        let text = std::fs::read_to_string(&config.input_path)
            .map_err(|e| FundReportError::io(&config.input_path, e))?;

        let output = Self::process(&text, config)?;

        write_report(&output.report, &config.report_path)?;
        info!("Report written to {}", config.report_path.display());

        if let Some(path) = &config.chart_path {
            render_chart(&ReturnSeries::from_observations(&output.enriched), path)?;
            info!("Chart written to {}", path.display());
        }
        if let Some(path) = &config.ledger_csv_path {
            export_ledger_csv(&output.enriched, path)?;
            info!("Ledger exported to {}", path.display());
        }
        if let Some(path) = &config.report_json_path {
            export_report_json(&output.report, path)?;
            info!("Report JSON exported to {}", path.display());
        }

        Ok(output)
    }
}
