//! Signal factors and the vote rule table.
//!
//! Each [`Factor`] owns a pair of predicates over an [`IndicatorRow`]: one
//! that casts a buy vote and one that casts a sell vote. A predicate that
//! touches an undefined column never votes.

use crate::domain::error::BacktallyError;
use crate::domain::frame::IndicatorRow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Factor {
    Rsi,
    Macd,
    BollingerBands,
    MovingAverage,
    DailyReturn,
    Volatility,
    Ema,
    LogReturn,
}

impl Factor {
    pub const ALL: [Factor; 8] = [
        Factor::Rsi,
        Factor::Macd,
        Factor::BollingerBands,
        Factor::MovingAverage,
        Factor::DailyReturn,
        Factor::Volatility,
        Factor::Ema,
        Factor::LogReturn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Factor::Rsi => "RSI",
            Factor::Macd => "MACD",
            Factor::BollingerBands => "Bollinger Bands",
            Factor::MovingAverage => "Moving Average",
            Factor::DailyReturn => "Daily Return",
            Factor::Volatility => "Volatility",
            Factor::Ema => "EMA",
            Factor::LogReturn => "Log Return",
        }
    }

    /// Descriptive label, where one exists.
    pub fn long_label(&self) -> Option<&'static str> {
        match self {
            Factor::Rsi => Some("Relative Strength Index (RSI)"),
            Factor::Macd => Some("Moving Average Convergence/Divergence (MACD)"),
            Factor::Ema => Some("Exponential Moving Average (EMA)"),
            _ => None,
        }
    }

    pub fn rule(&self) -> &'static VoteRule {
        &VOTE_RULES[*self as usize]
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Factor {
    type Err = BacktallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Factor::ALL
            .into_iter()
            .find(|f| {
                f.label().eq_ignore_ascii_case(wanted)
                    || f.long_label()
                        .is_some_and(|l| l.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| BacktallyError::UnknownFactor {
                label: wanted.to_string(),
            })
    }
}

/// The distinct factors selected for a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FactorSet(BTreeSet<Factor>);

impl FactorSet {
    pub fn all() -> Self {
        Factor::ALL.into_iter().collect()
    }

    /// Parse a comma-separated label list. Empty entries are ignored.
    pub fn parse_list(list: &str) -> Result<Self, BacktallyError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Factor::from_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, factor: Factor) -> bool {
        self.0.contains(&factor)
    }

    pub fn iter(&self) -> impl Iterator<Item = Factor> + '_ {
        self.0.iter().copied()
    }

    /// Vote margin a side must exceed: round(n / 3), halves away from zero.
    pub fn threshold(&self) -> u32 {
        (self.0.len() as f64 / 3.0).round() as u32
    }
}

impl FromIterator<Factor> for FactorSet {
    fn from_iter<I: IntoIterator<Item = Factor>>(iter: I) -> Self {
        FactorSet(iter.into_iter().collect())
    }
}

impl fmt::Display for FactorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(|f| f.label()).collect();
        f.write_str(&labels.join(", "))
    }
}

/// Series-wide values a predicate may compare a row against.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoteContext {
    pub mean_daily_return: Option<f64>,
}

pub type Predicate = fn(&IndicatorRow, &VoteContext) -> bool;

pub struct VoteRule {
    pub factor: Factor,
    pub buy: Predicate,
    pub sell: Predicate,
}

/// Indexed by `Factor as usize`.
pub static VOTE_RULES: [VoteRule; 8] = [
    VoteRule {
        factor: Factor::Rsi,
        buy: rsi_oversold,
        sell: rsi_overbought,
    },
    VoteRule {
        factor: Factor::Macd,
        buy: macd_above_signal,
        sell: macd_below_signal,
    },
    VoteRule {
        factor: Factor::BollingerBands,
        buy: close_below_lower_band,
        sell: close_above_upper_band,
    },
    VoteRule {
        factor: Factor::MovingAverage,
        buy: short_ma_below_long,
        sell: short_ma_above_long,
    },
    VoteRule {
        factor: Factor::DailyReturn,
        buy: return_above_mean,
        sell: return_below_mean,
    },
    VoteRule {
        factor: Factor::Volatility,
        buy: volatility_below_mean,
        sell: volatility_above_mean,
    },
    VoteRule {
        factor: Factor::Ema,
        buy: fast_ema_above_slow,
        sell: fast_ema_below_slow,
    },
    VoteRule {
        factor: Factor::LogReturn,
        buy: log_return_positive,
        sell: log_return_negative,
    },
];

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

fn above(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

fn below(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

fn rsi_oversold(row: &IndicatorRow, _: &VoteContext) -> bool {
    below(row.rsi, Some(RSI_OVERSOLD))
}

fn rsi_overbought(row: &IndicatorRow, _: &VoteContext) -> bool {
    above(row.rsi, Some(RSI_OVERBOUGHT))
}

fn macd_above_signal(row: &IndicatorRow, _: &VoteContext) -> bool {
    above(row.macd, row.macd_signal)
}

fn macd_below_signal(row: &IndicatorRow, _: &VoteContext) -> bool {
    below(row.macd, row.macd_signal)
}

fn close_below_lower_band(row: &IndicatorRow, _: &VoteContext) -> bool {
    below(Some(row.close), row.bollinger_lower)
}

fn close_above_upper_band(row: &IndicatorRow, _: &VoteContext) -> bool {
    above(Some(row.close), row.bollinger_upper)
}

fn short_ma_below_long(row: &IndicatorRow, _: &VoteContext) -> bool {
    below(row.ma_7, row.ma_30)
}

fn short_ma_above_long(row: &IndicatorRow, _: &VoteContext) -> bool {
    above(row.ma_7, row.ma_30)
}

fn return_above_mean(row: &IndicatorRow, ctx: &VoteContext) -> bool {
    above(row.daily_return, ctx.mean_daily_return)
}

fn return_below_mean(row: &IndicatorRow, ctx: &VoteContext) -> bool {
    below(row.daily_return, ctx.mean_daily_return)
}

fn volatility_below_mean(row: &IndicatorRow, _: &VoteContext) -> bool {
    below(row.volatility, row.volatility_mean)
}

fn volatility_above_mean(row: &IndicatorRow, _: &VoteContext) -> bool {
    above(row.volatility, row.volatility_mean)
}

fn fast_ema_above_slow(row: &IndicatorRow, _: &VoteContext) -> bool {
    above(row.ema_12, row.ema_26)
}

fn fast_ema_below_slow(row: &IndicatorRow, _: &VoteContext) -> bool {
    below(row.ema_12, row.ema_26)
}

fn log_return_positive(row: &IndicatorRow, _: &VoteContext) -> bool {
    above(row.log_return, Some(0.0))
}

fn log_return_negative(row: &IndicatorRow, _: &VoteContext) -> bool {
    below(row.log_return, Some(0.0))
}
