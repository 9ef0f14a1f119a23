//! Day-by-day trading simulation over a shared cash ledger.
//!
//! Per date, in ascending order:
//! 1. N = number of stocks with a buy flag on the date
//! 2. allocation = opening cash / N, fixed for the whole date
//! 3. stocks in ascending symbol order: buy floor(allocation / close) shares
//!    on a buy flag, sell the whole position on a sell flag
//! 4. value = cash + shares × close for every stock priced on the date
//!
//! Positions still open after the last date are reported, not liquidated.

use crate::domain::error::BacktallyError;
use crate::domain::signal::{SignalSeries, build_unified_timeline};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub cash: f64,
    pub shares_held: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Buy,
    Sell,
    Holding,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Buy => write!(f, "BUY"),
            ActionKind::Sell => write!(f, "SELL"),
            ActionKind::Holding => write!(f, "HOLDING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub date: NaiveDate,
    pub kind: ActionKind,
    pub code: String,
    pub quantity: u64,
    pub price: f64,
    pub resulting_cash: f64,
}

impl ActionRecord {
    /// Cash moved by the action, or the position value for a holding.
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Buy => write!(
                f,
                "{}: Buy {} shares of {} at ${:.2}, Cost: ${:.2}, Cash Balance: ${:.2}",
                self.date,
                self.quantity,
                self.code,
                self.price,
                self.amount(),
                self.resulting_cash
            ),
            ActionKind::Sell => write!(
                f,
                "{}: Sell {} shares of {} at ${:.2}, Received: ${:.2}, Cash Balance: ${:.2}",
                self.date,
                self.quantity,
                self.code,
                self.price,
                self.amount(),
                self.resulting_cash
            ),
            ActionKind::Holding => write!(
                f,
                "{} shares of {} worth ${:.2}",
                self.quantity,
                self.code,
                self.amount()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub total_value: f64,
}

/// A position open at the end of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub code: String,
    pub shares: u64,
    pub price: f64,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub daily_values: Vec<DailyValue>,
    pub actions: Vec<ActionRecord>,
    pub holdings: Vec<Holding>,
    pub final_cash: f64,
}

/// A single-use simulation run. `run` consumes it.
#[derive(Debug)]
pub struct Simulation {
    state: SimulationState,
}

impl Simulation {
    pub fn new(universe: &[String], initial_fund: f64) -> Result<Self, BacktallyError> {
        if universe.is_empty() {
            return Err(BacktallyError::EmptyPortfolio);
        }
        if initial_fund <= 0.0 || !initial_fund.is_finite() {
            return Err(BacktallyError::InvalidRange {
                reason: format!("initial fund must be positive, got {}", initial_fund),
            });
        }
        let shares_held = universe.iter().map(|code| (code.clone(), 0)).collect();
        Ok(Self {
            state: SimulationState {
                cash: initial_fund,
                shares_held,
            },
        })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Cash plus every position at the given closes. Unpriced positions are skipped.
    pub fn total_value(&self, closes: &BTreeMap<&str, f64>) -> f64 {
        self.state.cash
            + self
                .state
                .shares_held
                .iter()
                .filter(|(_, shares)| **shares > 0)
                .filter_map(|(code, &shares)| {
                    closes.get(code.as_str()).map(|close| shares as f64 * close)
                })
                .sum::<f64>()
    }

    pub fn run(mut self, series: &[SignalSeries]) -> SimulationOutcome {
        let mut ordered: Vec<&SignalSeries> = series.iter().collect();
        ordered.sort_by(|a, b| a.code.cmp(&b.code));

        let timeline = build_unified_timeline(series);
        let mut daily_values = Vec::with_capacity(timeline.len());
        let mut actions = Vec::new();

        for &date in &timeline {
            let buy_count = ordered
                .iter()
                .filter_map(|s| s.get(date))
                .filter(|sig| sig.buy_flag)
                .count();
            let allocation = if buy_count > 0 {
                self.state.cash / buy_count as f64
            } else {
                0.0
            };

            let mut closes: BTreeMap<&str, f64> = BTreeMap::new();
            for s in &ordered {
                let Some(sig) = s.get(date) else {
                    continue;
                };
                closes.insert(s.code.as_str(), sig.close);

                if sig.buy_flag {
                    if let Some(action) = self.buy(&s.code, date, sig.close, allocation) {
                        actions.push(action);
                    }
                }
                if sig.sell_flag {
                    if let Some(action) = self.sell(&s.code, date, sig.close) {
                        actions.push(action);
                    }
                }
            }

            daily_values.push(DailyValue {
                date,
                total_value: self.total_value(&closes),
            });
        }

        let holdings = self.closing_holdings(&ordered);
        if let Some(&last_date) = timeline.last() {
            actions.extend(holdings.iter().map(|h| ActionRecord {
                date: last_date,
                kind: ActionKind::Holding,
                code: h.code.clone(),
                quantity: h.shares,
                price: h.price,
                resulting_cash: self.state.cash,
            }));
        }

        SimulationOutcome {
            daily_values,
            actions,
            holdings,
            final_cash: self.state.cash,
        }
    }

    fn buy(
        &mut self,
        code: &str,
        date: NaiveDate,
        price: f64,
        allocation: f64,
    ) -> Option<ActionRecord> {
        if price <= 0.0 || price.is_nan() || allocation <= 0.0 {
            return None;
        }
        // floating point division must never let the ledger go negative
        let affordable = (self.state.cash / price).floor();
        let shares = (allocation / price).floor().min(affordable);
        if shares < 1.0 {
            return None;
        }
        let shares = shares as u64;
        let cost = shares as f64 * price;
        self.state.cash = (self.state.cash - cost).max(0.0);
        *self.state.shares_held.entry(code.to_string()).or_insert(0) += shares;

        tracing::debug!(%date, code, shares, price, cash = self.state.cash, "buy");
        Some(ActionRecord {
            date,
            kind: ActionKind::Buy,
            code: code.to_string(),
            quantity: shares,
            price,
            resulting_cash: self.state.cash,
        })
    }

    fn sell(&mut self, code: &str, date: NaiveDate, price: f64) -> Option<ActionRecord> {
        let held = self.state.shares_held.get_mut(code)?;
        if *held == 0 {
            return None;
        }
        let shares = std::mem::take(held);
        self.state.cash += shares as f64 * price;

        tracing::debug!(%date, code, shares, price, cash = self.state.cash, "sell");
        Some(ActionRecord {
            date,
            kind: ActionKind::Sell,
            code: code.to_string(),
            quantity: shares,
            price,
            resulting_cash: self.state.cash,
        })
    }

    fn closing_holdings(&self, ordered: &[&SignalSeries]) -> Vec<Holding> {
        ordered
            .iter()
            .filter_map(|s| {
                let shares = self.state.shares_held.get(&s.code).copied().unwrap_or(0);
                let last = s.last()?;
                (shares > 0).then(|| Holding {
                    code: s.code.clone(),
                    shares,
                    price: last.close,
                    value: shares as f64 * last.close,
                })
            })
            .collect()
    }
}
