//! Backtest orchestration over pre-fetched price histories.
//!
//! Indicators are computed over each stock's whole history so that bars
//! before `start_date` warm them up; only signals inside
//! `[start_date, end_date]` reach the simulator.

use crate::domain::error::BacktallyError;
use crate::domain::factor::FactorSet;
use crate::domain::frame::IndicatorFrame;
use crate::domain::performance::{DEFAULT_RISK_FREE_RATE, PerformanceReport};
use crate::domain::price::{PricePoint, is_strictly_ascending};
use crate::domain::signal::{SignalSeries, generate_signals};
use crate::domain::simulator::{ActionRecord, DailyValue, Simulation};
use chrono::NaiveDate;
use std::fmt;

pub const DEFAULT_INITIAL_FUND: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_fund: f64,
    pub risk_free_rate: f64,
    pub factors: FactorSet,
}

impl BacktestConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            initial_fund: DEFAULT_INITIAL_FUND,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            factors: FactorSet::all(),
        }
    }

    pub fn validate(&self) -> Result<(), BacktallyError> {
        if self.start_date > self.end_date {
            return Err(BacktallyError::InvalidRange {
                reason: format!(
                    "start_date ({}) is after end_date ({})",
                    self.start_date, self.end_date
                ),
            });
        }
        if self.initial_fund <= 0.0 || !self.initial_fund.is_finite() {
            return Err(BacktallyError::InvalidRange {
                reason: format!("initial_fund must be positive, got {}", self.initial_fund),
            });
        }
        if self.factors.is_empty() {
            return Err(BacktallyError::EmptyFactorSet);
        }
        Ok(())
    }
}

/// One stock's fetched price history, ascending by date.
#[derive(Debug, Clone)]
pub struct StockHistory {
    pub code: String,
    pub prices: Vec<PricePoint>,
}

impl StockHistory {
    pub fn new(code: impl Into<String>, prices: Vec<PricePoint>) -> Self {
        Self {
            code: code.into(),
            prices,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoData,
    NoDataInRange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no price history"),
            SkipReason::NoDataInRange => write!(f, "no prices in the requested range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStock {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// Stocks that took part in the simulation, ascending.
    pub universe: Vec<String>,
    pub daily_values: Vec<DailyValue>,
    pub actions: Vec<ActionRecord>,
    pub report: PerformanceReport,
    pub skipped: Vec<SkippedStock>,
}

pub fn run_backtest(
    config: &BacktestConfig,
    histories: &[StockHistory],
) -> Result<BacktestResult, BacktallyError> {
    config.validate()?;
    if histories.is_empty() {
        return Err(BacktallyError::EmptyPortfolio);
    }

    let mut skipped = Vec::new();
    let mut series: Vec<SignalSeries> = Vec::with_capacity(histories.len());

    for history in histories {
        if history.prices.is_empty() {
            tracing::warn!(code = %history.code, "skipping stock with no price history");
            skipped.push(SkippedStock {
                code: history.code.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        }
        if !is_strictly_ascending(&history.prices) {
            return Err(BacktallyError::Data {
                reason: format!("{}: prices are not in strictly ascending date order", history.code),
            });
        }

        let frame = IndicatorFrame::compute(&history.code, &history.prices);
        let signals = generate_signals(&frame, &config.factors)
            .restrict_to(config.start_date, config.end_date);

        if signals.is_empty() {
            tracing::warn!(
                code = %history.code,
                start = %config.start_date,
                end = %config.end_date,
                "skipping stock with no prices in range"
            );
            skipped.push(SkippedStock {
                code: history.code.clone(),
                reason: SkipReason::NoDataInRange,
            });
            continue;
        }
        tracing::debug!(code = %history.code, rows = frame.row_count(), signals = signals.len(), "signals ready");
        series.push(signals);
    }

    if series.is_empty() {
        return Err(BacktallyError::NoHistoricalData {
            code: "all".to_string(),
        });
    }

    let mut universe: Vec<String> = series.iter().map(|s| s.code.clone()).collect();
    universe.sort();

    tracing::info!(stocks = universe.len(), factors = %config.factors, "running simulation");
    let outcome = Simulation::new(&universe, config.initial_fund)?.run(&series);

    let report = PerformanceReport::compute(
        &outcome.daily_values,
        config.initial_fund,
        config.risk_free_rate,
        outcome.holdings,
    );
    tracing::info!(
        final_value = report.final_value,
        days = outcome.daily_values.len(),
        trades = outcome.actions.len(),
        "simulation finished"
    );

    Ok(BacktestResult {
        universe,
        daily_values: outcome.daily_values,
        actions: outcome.actions,
        report,
        skipped,
    })
}
