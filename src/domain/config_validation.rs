//! Configuration validation.
//!
//! Validates every `[backtest]` field before any data is loaded, and builds
//! the typed [`BacktestConfig`] from a validated config.

use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_FUND};
use crate::domain::error::BacktallyError;
use crate::domain::factor::FactorSet;
use crate::domain::performance::DEFAULT_RISK_FREE_RATE;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const SECTION: &str = "backtest";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktallyError> {
    validate_initial_fund(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    parse_factors(config)?;
    validate_codes(config)?;
    Ok(())
}

/// Build the run configuration. The code list is resolved separately
/// since the command line may override it.
pub fn backtest_config_from(config: &dyn ConfigPort) -> Result<BacktestConfig, BacktallyError> {
    validate_initial_fund(config)?;
    validate_risk_free_rate(config)?;
    let (start_date, end_date) = read_dates(config)?;
    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_fund: config.get_double(SECTION, "initial_fund", DEFAULT_INITIAL_FUND),
        risk_free_rate: config.get_double(SECTION, "risk_free_rate", DEFAULT_RISK_FREE_RATE),
        factors: parse_factors(config)?,
    })
}

/// The configured code list, or `None` when the key is absent.
pub fn configured_codes(config: &dyn ConfigPort) -> Result<Option<Vec<String>>, BacktallyError> {
    match config.get_string(SECTION, "codes") {
        None => Ok(None),
        Some(list) => Ok(Some(parse_codes(&list)?)),
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> BacktallyError {
    BacktallyError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_initial_fund(config: &dyn ConfigPort) -> Result<(), BacktallyError> {
    if let Some(raw) = config.get_string(SECTION, "initial_fund") {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| invalid("initial_fund", format!("'{}' is not a number", raw)))?;
        if value <= 0.0 || !value.is_finite() {
            return Err(invalid("initial_fund", "initial_fund must be positive"));
        }
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), BacktallyError> {
    let value = config.get_double(SECTION, "risk_free_rate", DEFAULT_RISK_FREE_RATE);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), BacktallyError> {
    read_dates(config).map(|_| ())
}

fn read_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), BacktallyError> {
    let start_str = config.get_string(SECTION, "start_date");
    let end_str = config.get_string(SECTION, "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(BacktallyError::InvalidRange {
            reason: format!("start_date ({}) is after end_date ({})", start_date, end_date),
        });
    }
    Ok((start_date, end_date))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, BacktallyError> {
    match value {
        None => Err(BacktallyError::ConfigMissing {
            section: SECTION.to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(field, format!("invalid {} format, expected YYYY-MM-DD", field))
        }),
    }
}

fn parse_factors(config: &dyn ConfigPort) -> Result<FactorSet, BacktallyError> {
    match config.get_string(SECTION, "factors") {
        None => Ok(FactorSet::all()),
        Some(list) => {
            let factors = FactorSet::parse_list(&list)?;
            if factors.is_empty() {
                return Err(BacktallyError::EmptyFactorSet);
            }
            Ok(factors)
        }
    }
}

fn validate_codes(config: &dyn ConfigPort) -> Result<(), BacktallyError> {
    match configured_codes(config)? {
        Some(_) => Ok(()),
        None => Err(BacktallyError::ConfigMissing {
            section: SECTION.to_string(),
            key: "codes".to_string(),
        }),
    }
}
