//! Record parser for the line-oriented text produced by the extraction step.
//!
//! The input is a sequence of two-line blocks: a header line opening with the
//! date-column marker, then one data line whose columns are joined by the
//! delimiter. Anything else is noise and is skipped.

use crate::error::{FundReportError, Result};
use crate::schema::{RawRecord, SkippedBlock};
use log::{debug, warn};

pub const MIN_FIELDS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub records: Vec<RawRecord>,
    pub skipped: Vec<SkippedBlock>,
}

pub struct RecordParser<'a> {
    header_marker: &'a str,
    delimiter: &'a str,
}

impl<'a> RecordParser<'a> {
    pub fn new(header_marker: &'a str, delimiter: &'a str) -> Self {
        Self {
            header_marker,
            delimiter,
        }
    }

    /// Parses every block, collecting short data lines instead of failing on them.
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let lines: Vec<&str> = text.lines().collect();
        let mut outcome = ParseOutcome::default();

        let mut i = 0;
        while i < lines.len() {
            if lines[i].trim().starts_with(self.header_marker) {
                // The data line is consumed even when it turns out to be malformed
                i += 1;
                if let Some(data_line) = lines.get(i) {
                    let fields: Vec<&str> = data_line.trim().split(self.delimiter).collect();
                    if fields.len() >= MIN_FIELDS {
                        outcome.records.push(RawRecord {
                            date: fields[0].trim().to_string(),
                            unit_price: fields[1].trim().to_string(),
                            units_held: fields[2].trim().to_string(),
                            asset_value: fields[3].trim().to_string(),
                            profit_ratio: fields[4].trim().to_string(),
                            line: i + 1,
                        });
                    } else {
                        outcome.skipped.push(SkippedBlock {
                            line: i + 1,
                            field_count: fields.len(),
                            content: data_line.trim().to_string(),
                        });
                    }
                }
            }
            i += 1;
        }

        debug!(
            "Parsed {} record(s), skipped {} malformed block(s)",
            outcome.records.len(),
            outcome.skipped.len()
        );

        outcome
    }

    /// Like [`parse`](Self::parse), but any malformed block fails the whole call.
    pub fn parse_strict(&self, text: &str) -> Result<Vec<RawRecord>> {
        let outcome = self.parse(text);
        match outcome.skipped.first() {
            None => Ok(outcome.records),
            Some(first) => Err(FundReportError::ParseError {
                skipped: outcome.skipped.len(),
                details: format!(
                    "first at line {} with {} field(s): '{}'",
                    first.line, first.field_count, first.content
                ),
            }),
        }
    }
}

/// Runs the parser in lenient or strict mode and logs what was dropped.
pub fn parse_records(
    text: &str,
    header_marker: &str,
    delimiter: &str,
    strict: bool,
) -> Result<ParseOutcome> {
    let parser = RecordParser::new(header_marker, delimiter);

    if strict {
        let records = parser.parse_strict(text)?;
        return Ok(ParseOutcome {
            records,
            skipped: Vec::new(),
        });
    }

    let outcome = parser.parse(text);
    if !outcome.skipped.is_empty() {
        warn!(
            "Skipped {} malformed block(s) while parsing",
            outcome.skipped.len()
        );
        for block in &outcome.skipped {
            debug!(
                "Line {}: {} field(s) in '{}'",
                block.line, block.field_count, block.content
            );
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Ngày| Giá CCQ| SL CCQ sở hữu| Giá trị tài sản hiện tại| Tỷ lệ lãi lỗ trên vốn";

    fn parser() -> RecordParser<'static> {
        RecordParser::new("Ngày", "| ")
    }

    #[test]
    fn test_parses_two_line_blocks() {
        let text = format!(
            "{HEADER}\n01/01/2022| 10,000| 100| 1,000,000| 0%\n{HEADER}\n02/01/2022| 10,500| 110| 1,160,000| 1.5%\n"
        );
        let outcome = parser().parse(&text);

        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.skipped.is_empty());

        let second = &outcome.records[1];
        assert_eq!(second.date, "02/01/2022");
        assert_eq!(second.unit_price, "10,500");
        assert_eq!(second.units_held, "110");
        assert_eq!(second.asset_value, "1,160,000");
        assert_eq!(second.profit_ratio, "1.5%");
        assert_eq!(second.line, 4);
    }

    #[test]
    fn test_fields_are_trimmed_and_extra_fields_ignored() {
        let text = format!("  {HEADER}\n   03/02/2023|  12,000 | 50| 600,000 | -2.1% | extra\n");
        let outcome = parser().parse(&text);

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.date, "03/02/2023");
        assert_eq!(record.unit_price, "12,000");
        assert_eq!(record.asset_value, "600,000");
        assert_eq!(record.profit_ratio, "-2.1%");
    }

    #[test]
    fn test_short_block_is_skipped() {
        let text = format!(
            "{HEADER}\n01/01/2022| 10,000| 100\n{HEADER}\n02/01/2022| 10,500| 110| 1,160,000| 1%\n"
        );
        let outcome = parser().parse(&text);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].date, "02/01/2022");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].line, 2);
        assert_eq!(outcome.skipped[0].field_count, 3);
    }

    #[test]
    fn test_header_at_end_of_input_is_ignored() {
        let text = format!("{HEADER}\n01/01/2022| 10,000| 100| 1,000,000| 0%\n{HEADER}");
        let outcome = parser().parse(&text);

        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_noise_lines_are_skipped() {
        let text = format!(
            "```csv\nsome preamble\n{HEADER}\n05/05/2022| 9,800| 100| 980,000| -2%\n```\n"
        );
        let outcome = parser().parse(&text);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].date, "05/05/2022");
    }

    #[test]
    fn test_strict_mode_reports_skipped_blocks() {
        let text = format!("{HEADER}\n01/01/2022| 10,000| 100\n");
        let err = parser().parse_strict(&text).unwrap_err();

        match err {
            FundReportError::ParseError { skipped, details } => {
                assert_eq!(skipped, 1);
                assert!(details.contains("line 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lenient_entry_point_keeps_skipped_list() {
        let text = format!("{HEADER}\nbroken\n");
        let outcome = parse_records(&text, "Ngày", "| ", false).unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped.len(), 1);

        assert!(parse_records(&text, "Ngày", "| ", true).is_err());
    }
}
