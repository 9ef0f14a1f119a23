//! Performance summary of a simulated value series.

use crate::domain::error::BacktallyError;
use crate::domain::simulator::{DailyValue, Holding};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

// below this the deviation is rounding noise on constant returns
const MIN_STDDEV: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub final_value: f64,
    pub initial_fund: f64,
    pub total_return: f64,
    /// `None` when the compounded figure overflows.
    pub annualized_return: Option<f64>,
    /// `None` when the excess returns have no variance.
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub trading_days: usize,
    pub holdings: Vec<Holding>,
}

impl PerformanceReport {
    pub fn compute(
        daily_values: &[DailyValue],
        initial_fund: f64,
        risk_free_rate: f64,
        holdings: Vec<Holding>,
    ) -> Self {
        let final_value = daily_values
            .last()
            .map(|v| v.total_value)
            .unwrap_or(initial_fund);

        let total_return = if initial_fund > 0.0 {
            (final_value - initial_fund) / initial_fund
        } else {
            0.0
        };

        let trading_days = daily_values.len().saturating_sub(1).max(1);
        let values: Vec<f64> = daily_values.iter().map(|v| v.total_value).collect();
        let returns = daily_returns(&values);

        PerformanceReport {
            final_value,
            initial_fund,
            total_return,
            annualized_return: annualized_return(final_value, initial_fund, trading_days),
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate / TRADING_DAYS_PER_YEAR),
            max_drawdown: max_drawdown(&values),
            trading_days,
            holdings,
        }
    }

    pub fn require_sharpe(&self) -> Result<f64, BacktallyError> {
        self.sharpe_ratio.ok_or_else(|| BacktallyError::UndefinedMetric {
            metric: "sharpe ratio".to_string(),
        })
    }

    pub fn annualized_return_pct(&self) -> Option<f64> {
        self.annualized_return.map(|r| r * 100.0)
    }

    pub fn annualized_return_display(&self) -> String {
        match self.annualized_return_pct() {
            Some(pct) => format!("{:.2}%", pct),
            None => "undefined".to_string(),
        }
    }

    pub fn sharpe_display(&self) -> String {
        match self.sharpe_ratio {
            Some(s) => format!("{:.2}", s),
            None => "undefined".to_string(),
        }
    }

    pub fn holdings_value(&self) -> f64 {
        self.holdings.iter().map(|h| h.value).sum()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Final Portfolio Value: ${:.2}", self.final_value),
            format!("Annualized Return: {}", self.annualized_return_display()),
            format!("Sharpe Ratio: {}", self.sharpe_display()),
        ]
    }
}

/// (final / initial)^(252 / trading_days) - 1, or `None` when not finite.
pub fn annualized_return(final_value: f64, initial_fund: f64, trading_days: usize) -> Option<f64> {
    if initial_fund <= 0.0 {
        return None;
    }
    let days = trading_days.max(1) as f64;
    let annualized = (final_value / initial_fund).powf(TRADING_DAYS_PER_YEAR / days) - 1.0;
    annualized.is_finite().then_some(annualized)
}

/// Step returns; a step from a zero value counts as 0.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| {
            if w[0] != 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

/// Annualized mean excess return over its population standard deviation.
pub fn sharpe_ratio(returns: &[f64], daily_risk_free: f64) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let n = returns.len() as f64;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_risk_free).collect();
    let mean = excess.iter().sum::<f64>() / n;
    let variance = excess.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev.is_nan() || stddev <= MIN_STDDEV {
        return None;
    }
    let sharpe = mean / stddev * TRADING_DAYS_PER_YEAR.sqrt();
    sharpe.is_finite().then_some(sharpe)
}

/// Largest peak-to-trough fall as a fraction of the peak.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &v in values {
        if v > peak {
            peak = v;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - v) / peak);
        }
    }
    max_dd
}
