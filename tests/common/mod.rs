#![allow(dead_code)]

use backtally::domain::backtest::{BacktestConfig, StockHistory};
use backtally::domain::error::BacktallyError;
use backtally::domain::factor::{Factor, FactorSet};
pub use backtally::domain::price::PricePoint;
use backtally::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, code: &str, prices: Vec<PricePoint>) -> Self {
        self.data.insert(code.to_string(), prices);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, BacktallyError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(BacktallyError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|prices| {
                prices
                    .iter()
                    .filter(|p| start_date.is_none_or(|s| p.date >= s))
                    .filter(|p| end_date.is_none_or(|e| p.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktallyError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_price(code: &str, date: &str, close: f64) -> PricePoint {
    PricePoint {
        code: code.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000,
        dividends: 0.0,
        splits: 0.0,
    }
}

/// Consecutive calendar days starting at `start`, one per close.
pub fn make_prices(code: &str, start: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            PricePoint::from_close(code, start + chrono::Duration::days(i as i64), close)
        })
        .collect()
}

/// Smooth oscillating closes, long enough to warm up every indicator.
pub fn wave_prices(code: &str, start: &str, count: usize, base: f64) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..count)
        .map(|i| base + 10.0 * (i as f64 / 6.0).sin() + (i % 5) as f64 * 0.3)
        .collect();
    make_prices(code, start, &closes)
}

pub fn wave_history(code: &str, base: f64) -> StockHistory {
    StockHistory::new(code, wave_prices(code, "2024-01-01", 240, base))
}

pub fn history(code: &str, start: &str, closes: &[f64]) -> StockHistory {
    StockHistory::new(code, make_prices(code, start, closes))
}

/// Single-factor config: with one factor the vote threshold is 0, so a
/// positive log return always flags a buy and a negative one a sell.
pub fn log_return_config(start: NaiveDate, end: NaiveDate, fund: f64) -> BacktestConfig {
    let mut config = BacktestConfig::new(start, end);
    config.initial_fund = fund;
    config.factors = [Factor::LogReturn].into_iter().collect::<FactorSet>();
    config
}
