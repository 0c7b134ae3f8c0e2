//! Line chart of stated return vs. computed return on capital.

use crate::error::{FundReportError, Result};
use crate::schema::EnrichedObservation;
use crate::utils::REPORT_DATE_FORMAT;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;

pub const CHART_SIZE: (u32, u32) = (1200, 600);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    pub stated: Vec<(NaiveDate, f64)>,
    /// Only dates where return on capital is defined
    pub return_on_capital: Vec<(NaiveDate, f64)>,
}

impl ReturnSeries {
    pub fn from_observations(observations: &[EnrichedObservation]) -> Self {
        Self {
            stated: observations
                .iter()
                .map(|o| (o.date(), o.observation.stated_return_pct))
                .collect(),
            return_on_capital: observations
                .iter()
                .filter_map(|o| o.return_on_capital_pct.map(|roc| (o.date(), roc)))
                .collect(),
        }
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self
            .stated
            .iter()
            .chain(&self.return_on_capital)
            .map(|(d, _)| *d);
        let min = dates.clone().min()?;
        let max = dates.max()?;
        Some((min, max))
    }

    /// Value range across both series, padded by 5% so lines clear the frame.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let values = self
            .stated
            .iter()
            .chain(&self.return_on_capital)
            .map(|(_, v)| *v);
        let min = values.clone().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.min(v)))
        })?;
        let max = values.fold(f64::NEG_INFINITY, f64::max);

        let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
        Some((min - pad, max + pad))
    }
}

fn chart_err<E: std::fmt::Display>(err: E) -> FundReportError {
    FundReportError::ChartError(err.to_string())
}

pub fn render_chart(series: &ReturnSeries, path: &Path) -> Result<()> {
    let (start, end) = series
        .date_range()
        .ok_or_else(|| FundReportError::ChartError("no points to plot".to_string()))?;
    let (y_min, y_max) = series
        .value_range()
        .ok_or_else(|| FundReportError::ChartError("no points to plot".to_string()))?;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Investment Returns Over Time", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(start..end, y_min..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Return (%)")
        .x_label_formatter(&|d: &NaiveDate| d.format(REPORT_DATE_FORMAT).to_string())
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(
            series.stated.iter().copied(),
            BLUE.stroke_width(2),
        ))
        .map_err(chart_err)?
        .label("Stated Return")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(
            series.return_on_capital.iter().copied(),
            RED.stroke_width(2),
        ))
        .map_err(chart_err)?
        .label("Return on Capital")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}
