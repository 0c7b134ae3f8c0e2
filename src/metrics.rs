use crate::capital::unit_difference;
use crate::error::{FundReportError, Result};
use crate::schema::{EnrichedObservation, MonthlyBucket, Report};
use crate::utils::{format_date, mean, month_key, sample_std_dev};
use log::debug;
use std::collections::BTreeMap;

fn percent_change(from: u64, to: u64, context: &str) -> Result<f64> {
    if from == 0 {
        return Err(FundReportError::DivisionByZero {
            context: context.to_string(),
        });
    }
    Ok((to as f64 - from as f64) / from as f64 * 100.0)
}

/// Growth from the first to the last asset value of the filtered series.
pub fn total_growth(observations: &[EnrichedObservation]) -> Result<f64> {
    let (first, last) = endpoints(observations)?;
    percent_change(
        first.observation.asset_value,
        last.observation.asset_value,
        &format!(
            "total growth with zero asset value on {}",
            format_date(first.date())
        ),
    )
}

pub fn duration_days(observations: &[EnrichedObservation]) -> Result<i64> {
    let (first, last) = endpoints(observations)?;
    Ok((last.date() - first.date()).num_days())
}

/// Compounds `total_growth_pct` over a 365-day year.
pub fn annualized_return(total_growth_pct: f64, duration_days: i64, end_date: &str) -> Result<f64> {
    if duration_days <= 0 {
        return Err(FundReportError::InvalidDuration {
            date: end_date.to_string(),
        });
    }
    let growth_factor = 1.0 + total_growth_pct / 100.0;
    Ok((growth_factor.powf(365.0 / duration_days as f64) - 1.0) * 100.0)
}

/// Groups observations by calendar month, keeping first and last value in date order.
pub fn monthly_buckets(observations: &[EnrichedObservation]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();

    for observation in observations {
        let value = observation.observation.asset_value;
        months
            .entry(month_key(observation.date()))
            .and_modify(|(_, last)| *last = value)
            .or_insert((value, value));
    }

    months
        .into_iter()
        .map(|((year, month), (first_value, last_value))| MonthlyBucket {
            year,
            month,
            first_value,
            last_value,
            return_pct: (first_value != 0).then(|| {
                (last_value as f64 - first_value as f64) / first_value as f64 * 100.0
            }),
        })
        .collect()
}

fn endpoints(
    observations: &[EnrichedObservation],
) -> Result<(&EnrichedObservation, &EnrichedObservation)> {
    match (observations.first(), observations.last()) {
        (Some(first), Some(last)) if observations.len() >= 2 => Ok((first, last)),
        _ => Err(FundReportError::InsufficientData {
            found: observations.len(),
        }),
    }
}

pub struct MetricsEngine;

impl MetricsEngine {
    /// Computes the full report, or nothing at all.
    pub fn build_report(
        observations: &[EnrichedObservation],
        buckets: &[MonthlyBucket],
    ) -> Result<Report> {
        let (first, last) = endpoints(observations)?;

        let final_return_on_capital_pct = last.return_on_capital_pct.ok_or_else(|| {
            FundReportError::DivisionByZero {
                context: format!(
                    "no capital recorded by {}, return on capital has no baseline",
                    format_date(last.date())
                ),
            }
        })?;

        let total_growth_pct = total_growth(observations)?;
        let duration_days = duration_days(observations)?;
        let annualized_return_pct =
            annualized_return(total_growth_pct, duration_days, &format_date(last.date()))?;

        let price_change_pct = percent_change(
            first.observation.unit_price,
            last.observation.unit_price,
            &format!(
                "price change with zero unit price on {}",
                format_date(first.date())
            ),
        )?;

        let monthly_returns: Vec<f64> = buckets.iter().filter_map(|b| b.return_pct).collect();
        if monthly_returns.is_empty() {
            return Err(FundReportError::DivisionByZero {
                context: "every month opens at a zero asset value".to_string(),
            });
        }

        let values: Vec<u64> = observations
            .iter()
            .map(|o| o.observation.asset_value)
            .collect();
        let prices: Vec<f64> = observations
            .iter()
            .map(|o| o.observation.unit_price as f64)
            .collect();
        let units: Vec<u64> = observations
            .iter()
            .map(|o| o.observation.units_held)
            .collect();

        let unit_change = unit_difference(
            first.observation.units_held,
            last.observation.units_held,
            "over the reporting period",
        )?;

        let value_floats: Vec<f64> = values.iter().map(|v| *v as f64).collect();
        let highest_units = units.iter().copied().max().unwrap_or(0);
        let lowest_units = units.iter().copied().min().unwrap_or(0);

        let report = Report {
            period_start: first.date(),
            period_end: last.date(),
            duration_days,

            initial_value: first.observation.asset_value,
            final_value: last.observation.asset_value,
            total_growth_pct,
            annualized_return_pct,

            highest_value: values.iter().copied().max().unwrap_or(0),
            lowest_value: values.iter().copied().min().unwrap_or(0),
            average_value: mean(&value_floats),

            initial_units: first.observation.units_held,
            final_units: last.observation.units_held,
            unit_change,

            initial_price: first.observation.unit_price,
            final_price: last.observation.unit_price,
            price_change_pct,

            best_monthly_return_pct: monthly_returns
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
            worst_monthly_return_pct: monthly_returns
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min),
            average_monthly_return_pct: mean(&monthly_returns),

            total_units_acquired: highest_units - lowest_units,
            average_unit_price: mean(&prices),
            price_volatility: sample_std_dev(&prices),

            total_capital_invested: last.cumulative_capital,
            final_return_on_capital_pct,
        };

        debug!(
            "Report covers {} day(s) across {} month(s)",
            report.duration_days,
            buckets.len()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capital::track_capital;
    use crate::schema::Observation;
    use chrono::NaiveDate;

    fn obs(y: i32, m: u32, d: u32, price: u64, units: u64, value: u64) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            unit_price: price,
            units_held: units,
            asset_value: value,
            stated_return_pct: 0.0,
        }
    }

    fn enrich(observations: &[Observation]) -> Vec<EnrichedObservation> {
        track_capital(observations).unwrap().observations
    }

    #[test]
    fn test_total_growth_and_duration() {
        let series = enrich(&[
            obs(2022, 1, 1, 10_000, 100, 1_000_000),
            obs(2022, 1, 31, 10_500, 110, 1_155_000),
            obs(2022, 3, 2, 11_000, 110, 1_210_000),
        ]);

        let growth = total_growth(&series).unwrap();
        assert!((growth - 21.0).abs() < 1e-9);
        assert_eq!(duration_days(&series).unwrap(), 60);
    }

    #[test]
    fn test_annualized_return_one_year() {
        let annual = annualized_return(10.0, 365, "01/01/2023").unwrap();
        assert!((annual - 10.0).abs() < 1e-9);

        let half_year = annualized_return(10.0, 730, "01/01/2024").unwrap();
        assert!((half_year - 4.8809).abs() < 1e-3, "got {}", half_year);
    }

    #[test]
    fn test_annualized_return_rejects_zero_duration() {
        assert!(matches!(
            annualized_return(5.0, 0, "01/01/2022"),
            Err(FundReportError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_monthly_buckets() {
        let series = enrich(&[
            obs(2022, 1, 3, 10_000, 100, 1_000_000),
            obs(2022, 1, 20, 10_000, 100, 1_100_000),
            obs(2022, 2, 1, 10_000, 100, 1_100_000),
            obs(2022, 2, 25, 10_000, 100, 990_000),
            obs(2022, 4, 10, 10_000, 100, 1_200_000),
        ]);
        let buckets = monthly_buckets(&series);

        assert_eq!(buckets.len(), 3);
        assert_eq!((buckets[0].year, buckets[0].month), (2022, 1));
        assert!((buckets[0].return_pct.unwrap() - 10.0).abs() < 1e-9);
        assert!((buckets[1].return_pct.unwrap() + 10.0).abs() < 1e-9);
        assert_eq!(buckets[2].first_value, buckets[2].last_value);
        assert_eq!(buckets[2].return_pct, Some(0.0));
    }

    #[test]
    fn test_build_report() {
        let series = enrich(&[
            obs(2022, 1, 1, 10_000, 100, 1_000_000),
            obs(2022, 1, 15, 10_000, 120, 1_200_000),
            obs(2022, 2, 1, 11_000, 120, 1_320_000),
            obs(2022, 2, 28, 12_000, 110, 1_320_000),
        ]);
        let buckets = monthly_buckets(&series);
        let report = MetricsEngine::build_report(&series, &buckets).unwrap();

        assert_eq!(report.duration_days, 58);
        assert_eq!(report.initial_value, 1_000_000);
        assert_eq!(report.final_value, 1_320_000);
        assert!((report.total_growth_pct - 32.0).abs() < 1e-9);
        assert_eq!(report.highest_value, 1_320_000);
        assert_eq!(report.lowest_value, 1_000_000);
        assert!((report.average_value - 1_210_000.0).abs() < 1e-6);
        assert_eq!(report.unit_change, 10);
        assert!((report.price_change_pct - 20.0).abs() < 1e-9);
        assert!((report.best_monthly_return_pct - 20.0).abs() < 1e-9);
        assert!((report.worst_monthly_return_pct - 0.0).abs() < 1e-9);
        assert!((report.average_monthly_return_pct - 10.0).abs() < 1e-9);
        assert_eq!(report.total_units_acquired, 20);
        assert!((report.average_unit_price - 10_750.0).abs() < 1e-9);
        assert_eq!(report.total_capital_invested, 200_000);
        assert!((report.final_return_on_capital_pct - 560.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_change_beyond_i64_is_reported() {
        let mut series = enrich(&[
            obs(2022, 1, 1, 10_000, 100, 1_000_000),
            obs(2022, 2, 1, 10_000, 110, 1_100_000),
        ]);
        series[0].observation.units_held = 0;
        series[1].observation.units_held = u64::MAX;

        let err = MetricsEngine::build_report(&series, &monthly_buckets(&series)).unwrap_err();
        assert!(matches!(err, FundReportError::ArithmeticOverflow(_)));
    }

    #[test]
    fn test_single_record_is_insufficient() {
        let series = enrich(&[obs(2022, 1, 1, 10_000, 100, 1_000_000)]);
        let err = MetricsEngine::build_report(&series, &monthly_buckets(&series)).unwrap_err();
        assert!(matches!(err, FundReportError::InsufficientData { found: 1 }));
    }

    #[test]
    fn test_no_purchases_has_no_baseline() {
        let series = enrich(&[
            obs(2022, 1, 1, 10_000, 100, 1_000_000),
            obs(2022, 2, 1, 10_500, 100, 1_050_000),
        ]);
        let err = MetricsEngine::build_report(&series, &monthly_buckets(&series)).unwrap_err();
        assert!(matches!(err, FundReportError::DivisionByZero { .. }));
    }

    #[test]
    fn test_same_day_records_have_invalid_duration() {
        let series = enrich(&[
            obs(2022, 1, 1, 10_000, 100, 1_000_000),
            obs(2022, 1, 1, 10_000, 110, 1_100_000),
        ]);
        let err = MetricsEngine::build_report(&series, &monthly_buckets(&series)).unwrap_err();
        assert!(matches!(err, FundReportError::InvalidDuration { .. }));
    }
}
