//! Daily simple and log returns.
//!
//! DAILY_RETURN[i] = (C[i] - C[i-1]) / C[i-1], undefined when C[i-1] == 0
//! LOG_RETURN[i]   = ln(C[i] / C[i-1]),       undefined when the ratio is not positive
//!
//! Row 0 has no prior close and is always undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn calculate_daily_return(points: &[PricePoint]) -> IndicatorSeries {
    let values = pairwise(points, |prev, curr| {
        if prev == 0.0 {
            None
        } else {
            Some((curr - prev) / prev)
        }
    });
    IndicatorSeries::from_options(
        IndicatorType::DailyReturn,
        points.iter().map(|p| p.date),
        values,
    )
}

pub fn calculate_log_return(points: &[PricePoint]) -> IndicatorSeries {
    let values = pairwise(points, |prev, curr| {
        let ratio = curr / prev;
        if ratio.is_finite() && ratio > 0.0 {
            Some(ratio.ln())
        } else {
            None
        }
    });
    IndicatorSeries::from_options(
        IndicatorType::LogReturn,
        points.iter().map(|p| p.date),
        values,
    )
}

/// Mean of the defined values of a series, `None` if nothing is defined.
pub fn mean_defined(series: &IndicatorSeries) -> Option<f64> {
    let defined: Vec<f64> = series.simple_values().into_iter().flatten().collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}

fn pairwise<F>(points: &[PricePoint], f: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> Option<f64>,
{
    let mut out = Vec::with_capacity(points.len());
    if points.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(points.windows(2).map(|w| f(w[0].close, w[1].close)));
    out
}
