//! Simple Moving Average of closing prices. Warmup: first (n-1) rows invalid.

use crate::domain::indicator::stddev::rolling_mean;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn calculate_sma(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let closes: Vec<Option<f64>> = points.iter().map(|p| Some(p.close)).collect();
    IndicatorSeries::from_options(
        IndicatorType::Sma(period),
        points.iter().map(|p| p.date),
        rolling_mean(&closes, period),
    )
}
