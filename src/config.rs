use crate::error::{FundReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HEADER_MARKER: &str = "Ngày";
pub const DEFAULT_DELIMITER: &str = "| ";
pub const DEFAULT_OUTLIER_WINDOW: usize = 7;
pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub report_path: PathBuf,
    pub chart_path: Option<PathBuf>,
    /// Where to write the enriched ledger as CSV, if anywhere
    pub ledger_csv_path: Option<PathBuf>,
    pub report_json_path: Option<PathBuf>,

    /// Text that opens every header line in the extracted blob
    pub header_marker: String,
    pub delimiter: String,
    /// Fail the run instead of skipping malformed blocks
    pub strict: bool,

    pub outlier_window: usize,
    pub outlier_multiplier: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("extracted_text.csv"),
            report_path: PathBuf::from("investment_report.txt"),
            chart_path: Some(PathBuf::from("investment_growth.png")),
            ledger_csv_path: None,
            report_json_path: None,
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            strict: false,
            outlier_window: DEFAULT_OUTLIER_WINDOW,
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FundReportError::io(path, e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.header_marker.trim().is_empty() {
            return Err(FundReportError::InvalidConfig(
                "header marker must not be empty".to_string(),
            ));
        }
        if self.delimiter.is_empty() {
            return Err(FundReportError::InvalidConfig(
                "field delimiter must not be empty".to_string(),
            ));
        }
        if self.outlier_window == 0 {
            return Err(FundReportError::InvalidConfig(
                "outlier window must be at least 1".to_string(),
            ));
        }
        if !self.outlier_multiplier.is_finite() || self.outlier_multiplier <= 0.0 {
            return Err(FundReportError::InvalidConfig(format!(
                "outlier multiplier must be a positive number, got {}",
                self.outlier_multiplier
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.outlier_window, 7);
        assert_eq!(config.header_marker, "Ngày");
    }

    #[test]
    fn test_rejects_bad_filter_settings() {
        let config = PipelineConfig {
            outlier_window: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FundReportError::InvalidConfig(_))
        ));

        let config = PipelineConfig {
            outlier_multiplier: f64::NAN,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"input_path": "data.txt", "strict": true}"#).unwrap();
        assert_eq!(config.input_path, PathBuf::from("data.txt"));
        assert!(config.strict);
        assert_eq!(config.delimiter, "| ");
        assert_eq!(config.outlier_multiplier, 2.0);
    }
}
