//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, BacktestResult, run_backtest};
use crate::domain::config_validation::{
    backtest_config_from, configured_codes, validate_backtest_config,
};
use crate::domain::error::BacktallyError;
use crate::domain::factor::Factor;
use crate::domain::simulator::ActionKind;
use crate::domain::universe::{load_histories, parse_codes};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_OUTPUT_DIR: &str = "report";

#[derive(Parser, Debug)]
#[command(name = "backtally", about = "Indicator-vote trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated codes, overriding [backtest] codes
        #[arg(long)]
        codes: Option<String>,
        /// Directory of <CODE>.csv price files, overriding [data] directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Report directory, overriding [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the accepted signal factor labels
    Factors,
    /// List symbols with price files
    ListSymbols {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            codes,
            data_dir,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, codes.as_deref())
            } else {
                run_backtest_command(&config, codes.as_deref(), data_dir, output)
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Factors => run_factors(),
        Command::ListSymbols { data_dir, config } => run_list_symbols(data_dir, config.as_ref()),
        Command::Info {
            code,
            data_dir,
            config,
        } => run_info(code.as_deref(), data_dir, config.as_ref()),
    }
}

fn fail(err: &BacktallyError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Command-line codes win over the config; one of them is required.
pub fn resolve_codes(
    codes_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, BacktallyError> {
    if let Some(list) = codes_override {
        return Ok(parse_codes(list)?);
    }
    configured_codes(config)?.ok_or_else(|| BacktallyError::ConfigMissing {
        section: "backtest".into(),
        key: "codes".into(),
    })
}

pub fn resolve_data_dir(
    dir_override: Option<PathBuf>,
    config: Option<&dyn ConfigPort>,
) -> Result<PathBuf, BacktallyError> {
    dir_override
        .or_else(|| {
            config
                .and_then(|c| c.get_string("data", "directory"))
                .map(PathBuf::from)
        })
        .ok_or_else(|| BacktallyError::ConfigMissing {
            section: "data".into(),
            key: "directory".into(),
        })
}

pub fn resolve_output_dir(output_override: Option<PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    output_override
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

fn run_backtest_command(
    config_path: &Path,
    codes_override: Option<&str>,
    data_dir: Option<PathBuf>,
    output: Option<PathBuf>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Build and validate the run configuration
    let bt_config = match backtest_config_from(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let codes = match resolve_codes(codes_override, &adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let data_dir = match resolve_data_dir(data_dir, Some(&adapter as &dyn ConfigPort)) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let output_dir = resolve_output_dir(output, &adapter);

    // Stages 3-6: load, simulate, report
    let data_port = CsvAdapter::new(data_dir);
    match run_backtest_pipeline(&data_port, &CsvReportAdapter::new(), &bt_config, &codes, &output_dir) {
        Ok(result) => {
            print_summary(&result);
            eprintln!("\nReport written to: {}", output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Load every code's history, run the backtest and write the report.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    bt_config: &BacktestConfig,
    codes: &[String],
    output_dir: &Path,
) -> Result<BacktestResult, BacktallyError> {
    bt_config.validate()?;
    if codes.is_empty() {
        return Err(BacktallyError::EmptyPortfolio);
    }

    eprintln!("Loading price history for {} codes...", codes.len());
    let histories = load_histories(data_port, codes, bt_config.end_date)?;

    eprintln!(
        "Running backtest: {} to {}, factors: {}",
        bt_config.start_date, bt_config.end_date, bt_config.factors
    );
    let result = run_backtest(bt_config, &histories)?;

    for skipped in &result.skipped {
        eprintln!("warning: skipping {} ({})", skipped.code, skipped.reason);
    }

    report_port.write(&result, output_dir)?;
    Ok(result)
}

fn print_summary(result: &BacktestResult) {
    println!();
    for line in result.report.summary_lines() {
        println!("{}", line);
    }
    println!(
        "Max Drawdown: -{:.2}%",
        result.report.max_drawdown * 100.0
    );
    let trades = result
        .actions
        .iter()
        .filter(|a| a.kind != ActionKind::Holding)
        .count();
    println!("Trades: {}", trades);

    if !result.report.holdings.is_empty() {
        println!("\nHoldings:");
        for h in &result.report.holdings {
            println!("  {} shares of {} worth ${:.2}", h.shares, h.code, h.value);
        }
    }
}

pub fn run_dry_run(config_path: &Path, codes_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match backtest_config_from(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let codes = match resolve_codes(codes_override, &adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    eprintln!("Config validated successfully");

    eprintln!("\nBacktest:");
    eprintln!("  range:        {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  initial fund: ${:.2}", bt_config.initial_fund);
    eprintln!("  risk-free:    {:.4}", bt_config.risk_free_rate);

    eprintln!("\nFactors (threshold {}):", bt_config.factors.threshold());
    for factor in bt_config.factors.iter() {
        eprintln!("  {}", factor);
    }

    eprintln!("\nUniverse:");
    eprintln!("  codes: {}", codes.join(", "));

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_backtest_config(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_factors() -> ExitCode {
    for factor in Factor::ALL {
        match factor.long_label() {
            Some(long) => println!("{}\t{}", factor.label(), long),
            None => println!("{}", factor.label()),
        }
    }
    ExitCode::SUCCESS
}

fn data_adapter(data_dir: Option<PathBuf>, config_path: Option<&PathBuf>) -> Result<CsvAdapter, ExitCode> {
    let config = match config_path {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    resolve_data_dir(data_dir, config.as_ref().map(|c| c as &dyn ConfigPort))
        .map(CsvAdapter::new)
        .map_err(|e| fail(&e))
}

fn run_list_symbols(data_dir: Option<PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    let adapter = match data_adapter(data_dir, config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(code: Option<&str>, data_dir: Option<PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    let adapter = match data_adapter(data_dir, config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let codes = match code {
        Some(c) => vec![c.trim().to_uppercase()],
        None => match adapter.list_symbols() {
            Ok(s) => s,
            Err(e) => return fail(&e),
        },
    };

    for c in &codes {
        match adapter.get_data_range(c) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", c, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", c);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", c, e);
            }
        }
    }
    ExitCode::SUCCESS
}
