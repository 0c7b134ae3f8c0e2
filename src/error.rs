use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FundReportError {
    #[error("Parse error: {skipped} malformed block(s) skipped ({details})")]
    ParseError { skipped: usize, details: String },

    #[error("Normalization failed for {field} on line {line}: cannot convert '{value}'")]
    FormatError {
        field: &'static str,
        value: String,
        line: usize,
    },

    #[error("Insufficient data: need at least 2 records after filtering, found {found}")]
    InsufficientData { found: usize },

    #[error("Division by zero: {context}")]
    DivisionByZero { context: String },

    #[error("Invalid duration: first and last record both fall on {date}")]
    InvalidDuration { date: String },

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Chart rendering error: {0}")]
    ChartError(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FundReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FundReportError>;
