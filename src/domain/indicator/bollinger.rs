//! Bollinger Bands.
//!
//! - Middle: SMA over n closes
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation of the same n closes.
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) rows are invalid.

use crate::domain::indicator::stddev::{sample_stddev, window_mean};
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::{PricePoint, closes};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    points: &[PricePoint],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mult = stddev_mult_x100 as f64 / 100.0;
    let closes = closes(points);

    let values = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let bands = if period > 0 && i + 1 >= period {
                let window = &closes[i + 1 - period..=i];
                sample_stddev(window).map(|sd| {
                    let middle = window_mean(window);
                    (middle + mult * sd, middle, middle - mult * sd)
                })
            } else {
                None
            };

            let (upper, middle, lower) = bands.unwrap_or((0.0, 0.0, 0.0));
            IndicatorPoint {
                date: p.date,
                valid: bands.is_some(),
                value: IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::points;

    fn bands(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.values[i].value {
            IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            } => (upper, middle, lower),
            _ => panic!("Expected Bollinger value"),
        }
    }

    #[test]
    fn bollinger_warmup() {
        let prices: Vec<f64> = (0..25).map(|i| 100.0 + (i % 3) as f64).collect();
        let series = calculate_bollinger(&points(&prices), DEFAULT_PERIOD, DEFAULT_MULT_X100);
        assert!(!series.values[18].valid);
        assert!(series.values[19].valid);
    }

    #[test]
    fn bollinger_known_values() {
        let series = calculate_bollinger(&points(&[1.0, 2.0, 3.0]), 3, 200);
        let (upper, middle, lower) = bands(&series, 2);
        // sample stddev of 1,2,3 is 1
        assert!((middle - 2.0).abs() < 1e-12);
        assert!((upper - 4.0).abs() < 1e-12);
        assert!((lower - 0.0).abs() < 1e-12);
    }

    #[test]
    fn bollinger_constant_prices_collapse() {
        let series = calculate_bollinger(&points(&[50.0; 4]), 3, 200);
        let (upper, middle, lower) = bands(&series, 3);
        assert_eq!(upper, 50.0);
        assert_eq!(middle, 50.0);
        assert_eq!(lower, 50.0);
    }

    #[test]
    fn bollinger_multiplier_scales_width() {
        let narrow = calculate_bollinger(&points(&[1.0, 2.0, 3.0]), 3, 100);
        let (upper, _, lower) = bands(&narrow, 2);
        assert!((upper - lower - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bollinger_degenerate_periods() {
        let bars = points(&[1.0, 2.0]);
        assert!(calculate_bollinger(&bars, 0, 200).values.iter().all(|p| !p.valid));
        assert!(calculate_bollinger(&bars, 1, 200).values.iter().all(|p| !p.valid));
    }
}
