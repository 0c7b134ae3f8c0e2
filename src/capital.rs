use crate::error::{FundReportError, Result};
use crate::schema::{EnrichedObservation, InvestmentEvent, Observation};
use crate::utils::{format_date, format_thousands};
use log::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapitalLedger {
    pub observations: Vec<EnrichedObservation>,
    pub events: Vec<InvestmentEvent>,
}

/// Percentage gain of `asset_value` over the capital put in so far.
///
/// Not applicable (`None`) until some capital has been recorded.
pub fn return_on_capital(asset_value: u64, cumulative_capital: u64) -> Option<f64> {
    if cumulative_capital == 0 {
        return None;
    }
    let capital = cumulative_capital as f64;
    Some((asset_value as f64 - capital) / capital * 100.0)
}

pub fn describe_investment(event: &InvestmentEvent) -> String {
    format!(
        "Investment on {}: +{} units, {} VND at {} VND/unit",
        format_date(event.date),
        format_thousands(event.units_added as f64),
        format_thousands(event.capital_added as f64),
        format_thousands(event.unit_price as f64)
    )
}

/// Signed change from `from` to `to` units, failing when it does not fit an `i64`.
pub fn unit_difference(from: u64, to: u64, context: &str) -> Result<i64> {
    i64::try_from(to as i128 - from as i128).map_err(|_| {
        FundReportError::ArithmeticOverflow(format!(
            "unit change {} from {} to {} units",
            context, from, to
        ))
    })
}

/// Rebuilds the invested-capital series from changes in units held.
///
/// Only net purchases add capital; a drop in units is treated as a withdrawal
/// and leaves the running total where it was, so `cumulative_capital` never
/// decreases.
pub fn track_capital(observations: &[Observation]) -> Result<CapitalLedger> {
    let mut ledger = CapitalLedger::default();
    let mut cumulative_capital: u64 = 0;
    let mut previous_units: Option<u64> = None;

    for observation in observations {
        let unit_delta = match previous_units {
            None => 0,
            Some(previous) => unit_difference(
                previous,
                observation.units_held,
                &format!("on {}", format_date(observation.date)),
            )?,
        };

        let capital_added = if unit_delta > 0 {
            (unit_delta as u64)
                .checked_mul(observation.unit_price)
                .ok_or_else(|| {
                    FundReportError::ArithmeticOverflow(format!(
                        "capital added on {} ({} units at {})",
                        observation.date.format("%d/%m/%Y"),
                        unit_delta,
                        observation.unit_price
                    ))
                })?
        } else {
            0
        };

        cumulative_capital = cumulative_capital.checked_add(capital_added).ok_or_else(|| {
            FundReportError::ArithmeticOverflow(format!(
                "cumulative capital on {}",
                observation.date.format("%d/%m/%Y")
            ))
        })?;

        if unit_delta > 0 {
            let event = InvestmentEvent {
                date: observation.date,
                units_added: unit_delta as u64,
                capital_added,
                unit_price: observation.unit_price,
            };
            info!("{}", describe_investment(&event));
            ledger.events.push(event);
        }

        ledger.observations.push(EnrichedObservation {
            observation: observation.clone(),
            unit_delta,
            capital_added,
            cumulative_capital,
            return_on_capital_pct: return_on_capital(observation.asset_value, cumulative_capital),
        });

        previous_units = Some(observation.units_held);
    }

    Ok(ledger)
}
