//! Technical indicator calculators.
//!
//! Every calculator is a pure function of one stock's ascending price series
//! and returns an [`IndicatorSeries`] with one [`IndicatorPoint`] per input
//! row. Rows inside an indicator's lookback window carry `valid: false`;
//! consumers must treat those as undefined, never as zero.
//!
//! - [`returns`]: simple and log returns
//! - [`sma`], [`ema`]: moving averages
//! - [`stddev`]: rolling window helpers shared by the windowed indicators
//! - [`rsi`], [`macd`], [`bollinger`], [`volatility`]

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod returns;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod volatility;

pub use ema::calculate_ema;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    DailyReturn,
    LogReturn,
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Volatility(usize),
    VolatilityMean { period: usize, window: usize },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Build a series of `Simple` points; `None` entries become invalid points.
    pub fn from_options(
        indicator_type: IndicatorType,
        dates: impl IntoIterator<Item = NaiveDate>,
        values: Vec<Option<f64>>,
    ) -> Self {
        let values = dates
            .into_iter()
            .zip(values)
            .map(|(date, v)| IndicatorPoint {
                date,
                valid: v.is_some(),
                value: IndicatorValue::Simple(v.unwrap_or(0.0)),
            })
            .collect();

        IndicatorSeries {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `Simple` value at `index`, or `None` when the point is undefined.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }

    /// All `Simple` values, undefined points mapped to `None`.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        (0..self.values.len()).map(|i| self.simple_at(i)).collect()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::DailyReturn => write!(f, "DAILY_RETURN"),
            IndicatorType::LogReturn => write!(f, "LOG_RETURN"),
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Volatility(period) => write!(f, "VOLATILITY({})", period),
            IndicatorType::VolatilityMean { period, window } => {
                write!(f, "VOLATILITY_MEAN({},{})", period, window)
            }
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::price::PricePoint;
    use chrono::NaiveDate;

    /// One point per price on consecutive calendar days from 2024-01-01.
    pub fn points(prices: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PricePoint::from_close("TEST", start + chrono::Duration::days(i as i64), close)
            })
            .collect()
    }
}
