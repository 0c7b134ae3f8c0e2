use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One block of the extracted text, split into its five columns but not yet typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: String,
    pub unit_price: String,
    pub units_held: String,
    pub asset_value: String,
    pub profit_ratio: String,
    /// 1-based line number of the data line in the source text
    pub line: usize,
}

/// A block that was dropped by the parser because its data line was too short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBlock {
    pub line: usize,
    pub field_count: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Market price of one unit, in VND
    pub unit_price: u64,
    pub units_held: u64,
    /// Total holding value as reported upstream, in VND
    pub asset_value: u64,
    /// Profit/loss percentage as reported upstream
    pub stated_return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedObservation {
    #[serde(flatten)]
    pub observation: Observation,
    pub unit_delta: i64,
    /// Capital put in on this date; withdrawals never make this negative
    pub capital_added: u64,
    pub cumulative_capital: u64,
    /// `None` while no capital has been recorded yet
    pub return_on_capital_pct: Option<f64>,
}

impl EnrichedObservation {
    pub fn date(&self) -> NaiveDate {
        self.observation.date
    }
}

/// A net purchase of units, surfaced for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentEvent {
    pub date: NaiveDate,
    pub units_added: u64,
    pub capital_added: u64,
    pub unit_price: u64,
}

/// An observation removed by the moving-average filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedOutlier {
    pub date: NaiveDate,
    pub asset_value: u64,
    pub moving_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub first_value: u64,
    pub last_value: u64,
    /// `None` when the month opens at a zero asset value
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub duration_days: i64,

    pub initial_value: u64,
    pub final_value: u64,
    pub total_growth_pct: f64,
    pub annualized_return_pct: f64,

    pub highest_value: u64,
    pub lowest_value: u64,
    pub average_value: f64,

    pub initial_units: u64,
    pub final_units: u64,
    pub unit_change: i64,

    pub initial_price: u64,
    pub final_price: u64,
    pub price_change_pct: f64,

    pub best_monthly_return_pct: f64,
    pub worst_monthly_return_pct: f64,
    pub average_monthly_return_pct: f64,

    pub total_units_acquired: u64,
    pub average_unit_price: f64,
    /// Sample standard deviation of the unit price
    pub price_volatility: f64,

    pub total_capital_invested: u64,
    pub final_return_on_capital_pct: f64,
}
