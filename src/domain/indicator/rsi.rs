//! RSI (Relative Strength Index).
//!
//! Simple-mean variant: over the n rows ending at the current one,
//! avg_gain = mean of positive changes (others count as 0),
//! avg_loss = mean of negated negative changes (others count as 0).
//! Row 0 has no prior close; its change counts as 0.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0 (flat window),
//! which leaves the row undefined.
//!
//! Warmup: first n - 1 rows are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut values = vec![None; points.len()];

    if period > 0 && points.len() >= period {
        // changes[i] is the move into row i
        let changes: Vec<f64> = std::iter::once(0.0)
            .chain(points.windows(2).map(|w| w[1].close - w[0].close))
            .collect();

        for (i, value) in values.iter_mut().enumerate().skip(period - 1) {
            let window = &changes[i + 1 - period..=i];
            let avg_gain = window.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
            let avg_loss = window.iter().filter(|c| **c < 0.0).map(|c| -c).sum::<f64>()
                / period as f64;
            *value = rsi_from_averages(avg_gain, avg_loss);
        }
    }

    IndicatorSeries::from_options(
        IndicatorType::Rsi(period),
        points.iter().map(|p| p.date),
        values,
    )
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { None } else { Some(100.0) }
    } else {
        let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
        Some(rsi.clamp(0.0, 100.0))
    }
}
