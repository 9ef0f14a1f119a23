//! Volatility: rolling sample standard deviation of daily returns, and the
//! rolling mean of that volatility used as its own baseline.
//!
//! Daily returns start at row 1, so VOLATILITY(n) is first defined at row n
//! and VOLATILITY_MEAN(n, w) at row n + w - 1.

use crate::domain::indicator::returns::calculate_daily_return;
use crate::domain::indicator::stddev::{rolling_mean, rolling_stddev};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub const DEFAULT_PERIOD: usize = 30;

pub fn calculate_volatility(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let returns = calculate_daily_return(points).simple_values();
    IndicatorSeries::from_options(
        IndicatorType::Volatility(period),
        points.iter().map(|p| p.date),
        rolling_stddev(&returns, period),
    )
}

pub fn calculate_volatility_mean(volatility: &IndicatorSeries, window: usize) -> IndicatorSeries {
    let period = match volatility.indicator_type {
        IndicatorType::Volatility(p) => p,
        _ => 0,
    };
    IndicatorSeries::from_options(
        IndicatorType::VolatilityMean { period, window },
        volatility.values.iter().map(|p| p.date),
        rolling_mean(&volatility.simple_values(), window),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::points;

    fn zigzag(n: usize) -> Vec<PricePoint> {
        let prices: Vec<f64> = (0..n)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 + (i % 7) as f64 })
            .collect();
        points(&prices)
    }

    #[test]
    fn volatility_warmup() {
        let series = calculate_volatility(&zigzag(40), 30);
        assert!(!series.values[29].valid);
        assert!(series.values[30].valid);
    }

    #[test]
    fn volatility_mean_warmup() {
        let vol = calculate_volatility(&zigzag(70), 30);
        let mean = calculate_volatility_mean(&vol, 30);
        assert!(!mean.values[58].valid);
        assert!(mean.values[59].valid);
        assert_eq!(
            mean.indicator_type,
            IndicatorType::VolatilityMean {
                period: 30,
                window: 30
            }
        );
    }

    #[test]
    fn constant_growth_has_zero_volatility() {
        let series = calculate_volatility(&points(&[10.0; 6]), 3);
        assert_eq!(series.simple_at(5), Some(0.0));
    }

    #[test]
    fn volatility_is_positive_for_moving_prices() {
        let series = calculate_volatility(&zigzag(12), 5);
        for v in series.simple_values().into_iter().flatten() {
            assert!(v > 0.0);
        }
    }
}
