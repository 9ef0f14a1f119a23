//! IndicatorFrame: one stock's price history with every indicator column
//! the signal voter reads, aligned row for row with the input.

use crate::domain::indicator::returns::{calculate_daily_return, calculate_log_return, mean_defined};
use crate::domain::indicator::volatility::{calculate_volatility, calculate_volatility_mean};
use crate::domain::indicator::{
    IndicatorSeries, IndicatorValue, bollinger, calculate_ema, macd, rsi, sma, volatility,
};
use crate::domain::price::PricePoint;
use chrono::NaiveDate;
use std::collections::HashMap;

pub const MA_SHORT: usize = 7;
pub const MA_LONG: usize = 30;
pub const VOLATILITY_WINDOW: usize = volatility::DEFAULT_PERIOD;
pub const RSI_PERIOD: usize = rsi::DEFAULT_PERIOD;
pub const EMA_FAST: usize = macd::DEFAULT_FAST;
pub const EMA_SLOW: usize = macd::DEFAULT_SLOW;
pub const MACD_SIGNAL: usize = macd::DEFAULT_SIGNAL;
pub const BOLLINGER_PERIOD: usize = bollinger::DEFAULT_PERIOD;
pub const BOLLINGER_MULT_X100: u32 = bollinger::DEFAULT_MULT_X100;

/// One trading day of indicator values. `None` means undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub daily_return: Option<f64>,
    pub log_return: Option<f64>,
    pub ma_7: Option<f64>,
    pub ma_30: Option<f64>,
    pub volatility: Option<f64>,
    pub volatility_mean: Option<f64>,
    pub rsi: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub code: String,
    pub rows: Vec<IndicatorRow>,
    /// Mean of every defined daily return in the history.
    pub mean_daily_return: Option<f64>,
    pub date_index: HashMap<NaiveDate, usize>,
}

impl IndicatorFrame {
    /// Compute every indicator over `points`, which must be ascending by date.
    pub fn compute(code: &str, points: &[PricePoint]) -> Self {
        let daily_return = calculate_daily_return(points);
        let log_return = calculate_log_return(points);
        let ma_7 = sma::calculate_sma(points, MA_SHORT).simple_values();
        let ma_30 = sma::calculate_sma(points, MA_LONG).simple_values();
        let volatility_series = calculate_volatility(points, VOLATILITY_WINDOW);
        let volatility_mean =
            calculate_volatility_mean(&volatility_series, VOLATILITY_WINDOW).simple_values();
        let rsi = rsi::calculate_rsi(points, RSI_PERIOD).simple_values();
        let ema_12 = calculate_ema(points, EMA_FAST).simple_values();
        let ema_26 = calculate_ema(points, EMA_SLOW).simple_values();
        let (macd_line, macd_signal) =
            macd_columns(&macd::calculate_macd(points, EMA_FAST, EMA_SLOW, MACD_SIGNAL));
        let (upper, middle, lower) = bollinger_columns(&bollinger::calculate_bollinger(
            points,
            BOLLINGER_PERIOD,
            BOLLINGER_MULT_X100,
        ));

        let mean_daily_return = mean_defined(&daily_return);
        let daily_return = daily_return.simple_values();
        let log_return = log_return.simple_values();
        let volatility = volatility_series.simple_values();

        let rows: Vec<IndicatorRow> = points
            .iter()
            .enumerate()
            .map(|(i, p)| IndicatorRow {
                date: p.date,
                close: p.close,
                daily_return: daily_return[i],
                log_return: log_return[i],
                ma_7: ma_7[i],
                ma_30: ma_30[i],
                volatility: volatility[i],
                volatility_mean: volatility_mean[i],
                rsi: rsi[i],
                ema_12: ema_12[i],
                ema_26: ema_26[i],
                macd: macd_line.get(i).copied().flatten(),
                macd_signal: macd_signal.get(i).copied().flatten(),
                bollinger_upper: upper[i],
                bollinger_middle: middle[i],
                bollinger_lower: lower[i],
            })
            .collect();

        let date_index = rows.iter().enumerate().map(|(i, r)| (r.date, i)).collect();

        Self {
            code: code.to_string(),
            rows,
            mean_daily_return,
            date_index,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get_row(&self, date: NaiveDate) -> Option<&IndicatorRow> {
        self.date_index.get(&date).map(|&i| &self.rows[i])
    }
}

type Column = Vec<Option<f64>>;

fn macd_columns(series: &IndicatorSeries) -> (Column, Column) {
    series
        .values
        .iter()
        .map(|p| match p.value {
            IndicatorValue::Macd { line, signal, .. } if p.valid => (Some(line), Some(signal)),
            _ => (None, None),
        })
        .unzip()
}

fn bollinger_columns(series: &IndicatorSeries) -> (Column, Column, Column) {
    let mut upper = Vec::with_capacity(series.len());
    let mut middle = Vec::with_capacity(series.len());
    let mut lower = Vec::with_capacity(series.len());
    for p in &series.values {
        match p.value {
            IndicatorValue::Bollinger {
                upper: u,
                middle: m,
                lower: l,
            } if p.valid => {
                upper.push(Some(u));
                middle.push(Some(m));
                lower.push(Some(l));
            }
            _ => {
                upper.push(None);
                middle.push(None);
                lower.push(None);
            }
        }
    }
    (upper, middle, lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::points;

    fn wave(n: usize) -> Vec<PricePoint> {
        let prices: Vec<f64> = (0..n)
            .map(|i| 100.0 + ((i * 13) % 17) as f64 - 8.0 + i as f64 * 0.1)
            .collect();
        points(&prices)
    }

    fn first_defined(frame: &IndicatorFrame, column: fn(&IndicatorRow) -> Option<f64>) -> usize {
        frame
            .rows
            .iter()
            .position(|r| column(r).is_some())
            .unwrap_or(usize::MAX)
    }

    #[test]
    fn frame_rows_align_with_input() {
        let bars = wave(70);
        let frame = IndicatorFrame::compute("TEST", &bars);
        assert_eq!(frame.row_count(), 70);
        assert_eq!(frame.code, "TEST");
        for (row, bar) in frame.rows.iter().zip(&bars) {
            assert_eq!(row.date, bar.date);
            assert!((row.close - bar.close).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn frame_warmups() {
        let frame = IndicatorFrame::compute("TEST", &wave(70));
        assert_eq!(first_defined(&frame, |r| r.daily_return), 1);
        assert_eq!(first_defined(&frame, |r| r.log_return), 1);
        assert_eq!(first_defined(&frame, |r| r.ma_7), 6);
        assert_eq!(first_defined(&frame, |r| r.ma_30), 29);
        assert_eq!(first_defined(&frame, |r| r.bollinger_lower), 19);
        assert_eq!(first_defined(&frame, |r| r.bollinger_middle), 19);
        assert_eq!(first_defined(&frame, |r| r.rsi), 13);
        assert_eq!(first_defined(&frame, |r| r.volatility), 30);
        assert_eq!(first_defined(&frame, |r| r.volatility_mean), 59);
        assert_eq!(first_defined(&frame, |r| r.ema_12), 0);
        assert_eq!(first_defined(&frame, |r| r.ema_26), 0);
        assert_eq!(first_defined(&frame, |r| r.macd), 0);
        assert_eq!(first_defined(&frame, |r| r.macd_signal), 0);
    }

    #[test]
    fn frame_macd_is_ema_difference() {
        let frame = IndicatorFrame::compute("TEST", &wave(40));
        for row in &frame.rows {
            let diff = row.ema_12.unwrap() - row.ema_26.unwrap();
            assert!((row.macd.unwrap() - diff).abs() < 1e-9);
        }
    }

    #[test]
    fn frame_mean_daily_return() {
        let frame = IndicatorFrame::compute("TEST", &points(&[10.0, 11.0, 9.9]));
        let expected = (0.1 + (9.9 / 11.0 - 1.0)) / 2.0;
        assert!((frame.mean_daily_return.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn frame_get_row_by_date() {
        let bars = wave(5);
        let frame = IndicatorFrame::compute("TEST", &bars);
        let row = frame.get_row(bars[3].date).unwrap();
        assert_eq!(row.date, bars[3].date);
        assert!(
            frame
                .get_row(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
                .is_none()
        );
    }

    #[test]
    fn frame_empty_history() {
        let frame = IndicatorFrame::compute("TEST", &[]);
        assert_eq!(frame.row_count(), 0);
        assert!(frame.mean_daily_return.is_none());
    }

    #[test]
    fn frame_is_deterministic() {
        let bars = wave(65);
        let a = IndicatorFrame::compute("TEST", &bars);
        let b = IndicatorFrame::compute("TEST", &bars);
        assert_eq!(a.rows, b.rows);
    }
}
