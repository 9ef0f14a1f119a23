//! Exponential Moving Average.
//!
//! alpha = 2/(n+1), no bias adjustment: EMA[0] = C[0],
//! EMA[i] = C[i]*alpha + EMA[i-1]*(1-alpha).
//! Defined from the first row; a period of 0 yields an all-invalid series.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price::{PricePoint, closes};

/// Recursive EMA over raw values, seeded with the first value.
pub fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let ema = match prev {
            None => v,
            Some(p) => v * alpha + p * (1.0 - alpha),
        };
        out.push(ema);
        prev = Some(ema);
    }
    out
}

pub fn calculate_ema(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let values = if period == 0 {
        vec![None; points.len()]
    } else {
        let closes = closes(points);
        ema_values(&closes, period).into_iter().map(Some).collect()
    };

    IndicatorSeries::from_options(
        IndicatorType::Ema(period),
        points.iter().map(|p| p.date),
        values,
    )
}
