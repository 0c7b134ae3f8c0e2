//! Moving-average spike filter.
//!
//! Extraction misreads tend to show up as a single wildly inflated asset value
//! (a duplicated digit, a misplaced separator). Records whose value exceeds a
//! multiple of the trailing mean are dropped. This is a best-effort heuristic:
//! a genuine jump can be lost and a small misread can slip through.

use crate::schema::{DroppedOutlier, Observation};
use log::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub retained: Vec<Observation>,
    pub dropped: Vec<DroppedOutlier>,
}

/// Trailing mean over at most `window` values, using whatever is available at the start.
pub fn trailing_moving_average(values: &[u64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut averages = Vec::with_capacity(values.len());
    let mut sum: u128 = 0;

    for (i, value) in values.iter().enumerate() {
        sum += *value as u128;
        if i >= window {
            sum -= values[i - window] as u128;
        }
        let count = (i + 1).min(window);
        averages.push(sum as f64 / count as f64);
    }

    averages
}

pub struct OutlierFilter {
    window: usize,
    multiplier: f64,
}

impl OutlierFilter {
    pub fn new(window: usize, multiplier: f64) -> Self {
        Self { window, multiplier }
    }

    /// Keeps records with `asset_value <= multiplier * moving_average`.
    ///
    /// Averages come from the unfiltered sequence, so a dropped record still
    /// counts toward the mean of the records after it.
    pub fn apply(&self, observations: &[Observation]) -> FilterOutcome {
        let values: Vec<u64> = observations.iter().map(|o| o.asset_value).collect();
        let averages = trailing_moving_average(&values, self.window);

        let mut outcome = FilterOutcome::default();
        for (observation, average) in observations.iter().zip(averages) {
            if observation.asset_value as f64 <= self.multiplier * average {
                outcome.retained.push(observation.clone());
            } else {
                warn!(
                    "Dropping outlier on {}: asset value {} exceeds {}x moving average {:.0}",
                    observation.date.format("%d/%m/%Y"),
                    observation.asset_value,
                    self.multiplier,
                    average
                );
                outcome.dropped.push(DroppedOutlier {
                    date: observation.date,
                    asset_value: observation.asset_value,
                    moving_average: average,
                });
            }
        }

        debug!(
            "Outlier filter kept {} of {} observation(s)",
            outcome.retained.len(),
            observations.len()
        );

        outcome
    }
}
