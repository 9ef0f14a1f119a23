//! Market data access port.

use crate::domain::error::BacktallyError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

pub trait DataPort {
    /// Ascending prices for `code` within the optional inclusive bounds.
    /// A symbol with no data yields an empty vector, not an error.
    fn fetch_prices(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, BacktallyError>;

    fn list_symbols(&self) -> Result<Vec<String>, BacktallyError>;

    /// First date, last date and row count for `code`, if it has any data.
    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BacktallyError> {
        let prices = self.fetch_prices(code, None, None)?;
        Ok(match (prices.first(), prices.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, prices.len())),
            _ => None,
        })
    }
}
