//! Stock universe: code list parsing and history loading.

use crate::domain::backtest::StockHistory;
use crate::domain::error::BacktallyError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("code list is empty")]
    Empty,

    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

impl From<UniverseError> for BacktallyError {
    fn from(err: UniverseError) -> Self {
        BacktallyError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "codes".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Parse a comma-separated code list into uppercase, unique codes.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    if input.trim().is_empty() {
        return Err(UniverseError::Empty);
    }

    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Fetch every code's history up to `end_date`.
///
/// Bars after `end_date` are never loaded. Earlier bars are kept so
/// indicators can warm up before the simulated range.
pub fn load_histories(
    data_port: &dyn DataPort,
    codes: &[String],
    end_date: NaiveDate,
) -> Result<Vec<StockHistory>, BacktallyError> {
    codes
        .iter()
        .map(|code| {
            let prices = data_port.fetch_prices(code, None, Some(end_date))?;
            tracing::debug!(code = %code, bars = prices.len(), "loaded history");
            Ok(StockHistory::new(code.clone(), prices))
        })
        .collect()
}
