//! CSV file data adapter: one `<CODE>.csv` per symbol.
//!
//! Columns are located by header name. `date` and `close` are required;
//! missing `open`/`high`/`low` fall back to the close, missing `volume`,
//! `dividends` and `splits` to zero.

use crate::domain::error::BacktallyError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
    dividends: Option<usize>,
    splits: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord, path: &str) -> Result<Self, BacktallyError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| BacktallyError::Data {
                reason: format!("{}: missing {} column", path, name),
            })
        };
        Ok(Self {
            date: required("date")?,
            close: required("close")?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
            dividends: find("dividends"),
            splits: find("splits"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: Option<usize>,
    name: &str,
    line: u64,
) -> Result<Option<T>, BacktallyError>
where
    T::Err: std::fmt::Display,
{
    match index.and_then(|i| record.get(i)).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e| BacktallyError::Data {
            reason: format!("line {}: invalid {} value '{}': {}", line, name, raw, e),
        }),
    }
}

fn finite(value: f64, name: &str, line: u64) -> Result<f64, BacktallyError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BacktallyError::Data {
            reason: format!("line {}: {} is not a finite number", line, name),
        })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, BacktallyError> {
        let path = self.csv_path(code);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no price file");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(BacktallyError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let path_label = path.display().to_string();
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| BacktallyError::Data {
            reason: format!("{}: CSV header error: {}", path_label, e),
        })?;
        let cols = Columns::locate(headers, &path_label)?;

        let mut prices = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BacktallyError::Data {
                reason: format!("{}: CSV parse error: {}", path_label, e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = record.get(cols.date).map(str::trim).unwrap_or("");
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                BacktallyError::Data {
                    reason: format!("line {}: invalid date '{}': {}", line, date_str, e),
                }
            })?;

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            let close: f64 = parse_field(&record, Some(cols.close), "close", line)?
                .ok_or_else(|| BacktallyError::Data {
                    reason: format!("line {}: missing close value", line),
                })?;
            let close = finite(close, "close", line)?;
            let open = finite(parse_field(&record, cols.open, "open", line)?.unwrap_or(close), "open", line)?;
            let high = finite(parse_field(&record, cols.high, "high", line)?.unwrap_or(close), "high", line)?;
            let low = finite(parse_field(&record, cols.low, "low", line)?.unwrap_or(close), "low", line)?;
            let volume: i64 = parse_field(&record, cols.volume, "volume", line)?.unwrap_or(0);
            let dividends = parse_field(&record, cols.dividends, "dividends", line)?.unwrap_or(0.0);
            let splits = parse_field(&record, cols.splits, "splits", line)?.unwrap_or(0.0);

            prices.push(PricePoint {
                code: code.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
                dividends,
                splits,
            });
        }

        prices.sort_by_key(|p| p.date);
        if let Some(w) = prices.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(BacktallyError::Data {
                reason: format!("{}: duplicate date {}", path_label, w[0].date),
            });
        }
        Ok(prices)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktallyError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BacktallyError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BacktallyError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(".csv") {
                if !code.is_empty() {
                    symbols.push(code.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume,dividends,splits\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000,0.5,0\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000,0,0\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000,0,2\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(path.join("CBA.csv"), "date,close\n2024-01-15,80.5\n").unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn fetch_prices_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let prices = adapter.fetch_prices("BHP", None, None).unwrap();

        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0].date, date(15));
        assert_eq!(prices[0].open, 100.0);
        assert_eq!(prices[0].high, 110.0);
        assert_eq!(prices[0].low, 90.0);
        assert_eq!(prices[0].close, 105.0);
        assert_eq!(prices[0].volume, 50000);
        assert_eq!(prices[1].dividends, 0.5);
        assert_eq!(prices[2].splits, 2.0);
        assert_eq!(prices[2].code, "BHP");
    }

    #[test]
    fn fetch_prices_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let prices = adapter
            .fetch_prices("BHP", Some(date(16)), Some(date(16)))
            .unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].date, date(16));

        let prices = adapter.fetch_prices("BHP", None, Some(date(15))).unwrap();
        assert_eq!(prices.len(), 1);
    }

    #[test]
    fn close_only_file_uses_defaults() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let prices = adapter.fetch_prices("CBA", None, None).unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].open, 80.5);
        assert_eq!(prices[0].low, 80.5);
        assert_eq!(prices[0].volume, 0);
        assert_eq!(prices[0].dividends, 0.0);
    }

    #[test]
    fn missing_file_is_empty_history() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_prices("XYZ", None, None).unwrap().is_empty());
        assert_eq!(adapter.get_data_range("XYZ").unwrap(), None);
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("DUP.csv"),
            "date,close\n2024-01-15,1.0\n2024-01-15,2.0\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_prices("DUP", None, None).unwrap_err();
        assert!(matches!(err, BacktallyError::Data { .. }));
    }

    #[test]
    fn missing_close_column_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("BAD.csv"), "date,open\n2024-01-15,1.0\n").unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_prices("BAD", None, None).unwrap_err();
        assert!(err.to_string().contains("missing close column"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("BAD.csv"), "date,close\n2024-01-15,abc\n").unwrap();
        fs::write(dir.path().join("NAN.csv"), "date,close\n2024-01-15,NaN\n").unwrap();
        fs::write(dir.path().join("DATE.csv"), "date,close\n15/01/2024,1.0\n").unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(adapter.fetch_prices("BAD", None, None).is_err());
        assert!(adapter.fetch_prices("NAN", None, None).is_err());
        assert!(adapter.fetch_prices("DATE", None, None).is_err());
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["BHP", "CBA"]);
    }

    #[test]
    fn data_range_spans_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(
            adapter.get_data_range("BHP").unwrap(),
            Some((date(15), date(17), 3))
        );
    }
}
