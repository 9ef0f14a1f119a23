//! Report adapter writing plain files into an output directory:
//!
//! - `daily_values.csv`: date,total_value
//! - `actions.csv`: date,kind,code,quantity,price,resulting_cash
//! - `summary.txt`: headline metrics, holdings and skipped stocks

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktallyError;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const DAILY_VALUES_FILE: &str = "daily_values.csv";
pub const ACTIONS_FILE: &str = "actions.csv";
pub const SUMMARY_FILE: &str = "summary.txt";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn csv_err(e: csv::Error) -> BacktallyError {
    BacktallyError::Io(e.into())
}

fn write_daily_values(result: &BacktestResult, path: &Path) -> Result<(), BacktallyError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(["date", "total_value"])
        .map_err(csv_err)?;
    for v in &result.daily_values {
        writer
            .write_record([v.date.to_string(), format!("{:.2}", v.total_value)])
            .map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_actions(result: &BacktestResult, path: &Path) -> Result<(), BacktallyError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(["date", "kind", "code", "quantity", "price", "resulting_cash"])
        .map_err(csv_err)?;
    for a in &result.actions {
        writer
            .write_record([
                a.date.to_string(),
                a.kind.to_string(),
                a.code.clone(),
                a.quantity.to_string(),
                format!("{:.2}", a.price),
                format!("{:.2}", a.resulting_cash),
            ])
            .map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Text body of `summary.txt`.
pub fn render_summary(result: &BacktestResult) -> String {
    let report = &result.report;
    let mut out = String::new();

    for line in report.summary_lines() {
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out, "Total Return: {:.2}%", report.total_return * 100.0);
    let _ = writeln!(out, "Max Drawdown: -{:.2}%", report.max_drawdown * 100.0);
    let _ = writeln!(out, "Trading Days: {}", report.trading_days);
    let _ = writeln!(out, "Stocks: {}", result.universe.join(", "));

    if !report.holdings.is_empty() {
        let _ = writeln!(out, "\nHoldings:");
        for h in &report.holdings {
            let _ = writeln!(out, "  {} shares of {} worth ${:.2}", h.shares, h.code, h.value);
        }
    }

    if !result.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped:");
        for s in &result.skipped {
            let _ = writeln!(out, "  {}: {}", s.code, s.reason);
        }
    }

    let _ = writeln!(out, "\nActions:");
    for a in &result.actions {
        let _ = writeln!(out, "  {}", a);
    }
    out
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), BacktallyError> {
        fs::create_dir_all(output_dir)?;
        write_daily_values(result, &output_dir.join(DAILY_VALUES_FILE))?;
        write_actions(result, &output_dir.join(ACTIONS_FILE))?;
        fs::write(output_dir.join(SUMMARY_FILE), render_summary(result))?;
        tracing::info!(dir = %output_dir.display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{SkipReason, SkippedStock};
    use crate::domain::performance::PerformanceReport;
    use crate::domain::simulator::{ActionKind, ActionRecord, DailyValue, Holding};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_result() -> BacktestResult {
        let daily_values = vec![
            DailyValue {
                date: day(1),
                total_value: 1000.0,
            },
            DailyValue {
                date: day(2),
                total_value: 1200.0,
            },
        ];
        let holdings = vec![Holding {
            code: "A".into(),
            shares: 100,
            price: 12.0,
            value: 1200.0,
        }];
        let actions = vec![
            ActionRecord {
                date: day(1),
                kind: ActionKind::Buy,
                code: "A".into(),
                quantity: 100,
                price: 10.0,
                resulting_cash: 0.0,
            },
            ActionRecord {
                date: day(2),
                kind: ActionKind::Holding,
                code: "A".into(),
                quantity: 100,
                price: 12.0,
                resulting_cash: 0.0,
            },
        ];
        let report = PerformanceReport::compute(&daily_values, 1000.0, 0.02, holdings);
        BacktestResult {
            universe: vec!["A".into()],
            daily_values,
            actions,
            report,
            skipped: vec![SkippedStock {
                code: "B".into(),
                reason: SkipReason::NoData,
            }],
        }
    }

    #[test]
    fn writes_all_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report");
        CsvReportAdapter::new().write(&sample_result(), &out).unwrap();

        let values = fs::read_to_string(out.join(DAILY_VALUES_FILE)).unwrap();
        assert_eq!(values, "date,total_value\n2024-01-01,1000.00\n2024-01-02,1200.00\n");

        let actions = fs::read_to_string(out.join(ACTIONS_FILE)).unwrap();
        let lines: Vec<&str> = actions.lines().collect();
        assert_eq!(lines[0], "date,kind,code,quantity,price,resulting_cash");
        assert_eq!(lines[1], "2024-01-01,BUY,A,100,10.00,0.00");
        assert_eq!(lines[2], "2024-01-02,HOLDING,A,100,12.00,0.00");

        assert!(out.join(SUMMARY_FILE).exists());
    }

    #[test]
    fn summary_contents() {
        let summary = render_summary(&sample_result());
        assert!(summary.starts_with("Final Portfolio Value: $1200.00\n"));
        // a single step has no variance
        assert!(summary.contains("Sharpe Ratio: undefined"));
        assert!(summary.contains("Total Return: 20.00%"));
        assert!(summary.contains("100 shares of A worth $1200.00"));
        assert!(summary.contains("B: no price history"));
        assert!(summary.contains("2024-01-01: Buy 100 shares of A at $10.00"));
    }
}
