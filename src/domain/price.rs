//! Daily price bar for one stock.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub dividends: f64,
    pub splits: f64,
}

impl PricePoint {
    /// A bar where every price field is `close`. Mostly useful for fixtures and
    /// close-only data sources.
    pub fn from_close(code: &str, date: NaiveDate, close: f64) -> Self {
        PricePoint {
            code: code.to_string(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
            dividends: 0.0,
            splits: 0.0,
        }
    }
}

/// Closing prices of an ascending series.
pub fn closes(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.close).collect()
}

/// True when dates are strictly increasing (unique and ordered).
pub fn is_strictly_ascending(points: &[PricePoint]) -> bool {
    points.windows(2).all(|w| w[0].date < w[1].date)
}
