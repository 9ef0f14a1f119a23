//! Signal voting: per-row buy/sell vote tallies and flags.

use crate::domain::factor::{FactorSet, VoteContext};
use crate::domain::frame::IndicatorFrame;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub date: NaiveDate,
    pub close: f64,
    pub buy_flag: bool,
    pub sell_flag: bool,
    pub buy_votes: u32,
    pub sell_votes: u32,
}

impl Signal {
    /// Flags follow from the tallies: a side must win by more than `threshold`.
    pub fn from_votes(
        date: NaiveDate,
        close: f64,
        buy_votes: u32,
        sell_votes: u32,
        threshold: u32,
    ) -> Self {
        Self {
            date,
            close,
            buy_flag: buy_votes > sell_votes + threshold,
            sell_flag: sell_votes > buy_votes + threshold,
            buy_votes,
            sell_votes,
        }
    }
}

/// One stock's signals in ascending date order.
#[derive(Debug, Clone)]
pub struct SignalSeries {
    pub code: String,
    pub signals: Vec<Signal>,
    pub date_index: HashMap<NaiveDate, usize>,
}

impl SignalSeries {
    pub fn new(code: String, signals: Vec<Signal>) -> Self {
        let date_index = signals
            .iter()
            .enumerate()
            .map(|(i, s)| (s.date, i))
            .collect();
        Self {
            code,
            signals,
            date_index,
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Signal> {
        self.date_index.get(&date).map(|&i| &self.signals[i])
    }

    /// Keep only signals dated within `[start, end]`.
    pub fn restrict_to(self, start: NaiveDate, end: NaiveDate) -> Self {
        let signals = self
            .signals
            .into_iter()
            .filter(|s| s.date >= start && s.date <= end)
            .collect();
        Self::new(self.code, signals)
    }

    pub fn last(&self) -> Option<&Signal> {
        self.signals.last()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Tally votes for every row of `frame`. Row 0 has no prior day and never votes.
pub fn generate_signals(frame: &IndicatorFrame, factors: &FactorSet) -> SignalSeries {
    let ctx = VoteContext {
        mean_daily_return: frame.mean_daily_return,
    };
    let threshold = factors.threshold();

    let signals = frame
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (mut buy_votes, mut sell_votes) = (0u32, 0u32);
            if i > 0 {
                for factor in factors.iter() {
                    let rule = factor.rule();
                    if (rule.buy)(row, &ctx) {
                        buy_votes += 1;
                    }
                    if (rule.sell)(row, &ctx) {
                        sell_votes += 1;
                    }
                }
            }
            Signal::from_votes(row.date, row.close, buy_votes, sell_votes, threshold)
        })
        .collect();

    SignalSeries::new(frame.code.clone(), signals)
}

/// Sorted union of every date any series has a signal for.
pub fn build_unified_timeline(series: &[SignalSeries]) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.signals.iter().map(|sig| sig.date))
        .collect();
    unique_dates.into_iter().collect()
}
