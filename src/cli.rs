//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export::export_result;
use crate::adapters::file_config_adapter::{FileConfigAdapter, ENV_PREFIX};
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_TIMEFRAME};
use crate::domain::batch::{parse_symbols, run_batch, BatchOutcome};
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_risk_config, validate_strategy_config,
    DEFAULT_DATA_DIR, DEFAULT_SYMBOLS,
};
use crate::domain::error::SignalbtError;
use crate::domain::risk::{
    Direction, RiskConfig, RiskManager, DEFAULT_MAX_POSITION_SIZE, DEFAULT_STOP_LOSS_PCT,
    DEFAULT_TAKE_PROFIT_PCT,
};
use crate::domain::signal::Signal;
use crate::domain::strategy::{build_strategy, Strategy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "signalbt", about = "Indicator strategy signals and backtests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the configured strategy over each symbol
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, overriding [backtest] symbols
        #[arg(short, long)]
        symbol: Option<String>,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory for per-symbol trade and equity CSVs
        #[arg(long)]
        export_dir: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the latest signal for each symbol
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show cached data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: Option<String>,
    },
    /// List symbols with cached data for the configured timeframe
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
            export_dir,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(
                    &config,
                    symbol.as_deref(),
                    output.as_ref(),
                    export_dir.as_ref(),
                )
            }
        }
        Command::Signal { config, symbol } => run_signal(&config, symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn fail(err: &SignalbtError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path)
        .map(|adapter| adapter.with_env_prefix(ENV_PREFIX))
        .map_err(|e| fail(&e))
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, SignalbtError> {
    Ok(BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        start_date: parse_date(adapter, "start_date")?,
        end_date: parse_date(adapter, "end_date")?,
        timeframe: adapter
            .get_string("backtest", "timeframe")
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string()),
    })
}

pub fn build_risk_config(adapter: &dyn ConfigPort) -> RiskConfig {
    RiskConfig {
        max_position_size: adapter.get_double(
            "risk",
            "max_position_size",
            DEFAULT_MAX_POSITION_SIZE,
        ),
        stop_loss_pct: adapter.get_double("risk", "stop_loss_pct", DEFAULT_STOP_LOSS_PCT),
        take_profit_pct: adapter.get_double("risk", "take_profit_pct", DEFAULT_TAKE_PROFIT_PCT),
    }
}

/// Symbols from `--symbol` if given, else `[backtest] symbols`.
pub fn resolve_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, SignalbtError> {
    let (raw, key) = match symbol_override {
        Some(s) => (s.to_string(), "--symbol"),
        None => (
            config
                .get_string("backtest", "symbols")
                .unwrap_or_else(|| DEFAULT_SYMBOLS.to_string()),
            "symbols",
        ),
    };
    parse_symbols(&raw).map_err(|e| SignalbtError::config_invalid("backtest", key, e.to_string()))
}

pub fn data_adapter(config: &dyn ConfigPort) -> CsvAdapter {
    let dir = config
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    CsvAdapter::new(PathBuf::from(dir))
}

fn validate_all(adapter: &dyn ConfigPort) -> Result<(), SignalbtError> {
    validate_backtest_config(adapter)?;
    validate_strategy_config(adapter)?;
    validate_risk_config(adapter)?;
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_path: Option<&PathBuf>,
    export_dir: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        return fail(&e);
    }

    // Stage 2: Strategy, backtest parameters and symbols
    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    eprintln!("Loading strategy: {}", strategy.name());

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let symbols = match resolve_symbols(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    // Stage 3: Run and report
    let data_port = data_adapter(&adapter);
    eprintln!(
        "Running backtest: {} symbols, {} to {} ({})",
        symbols.len(),
        bt_config.start_date,
        bt_config.end_date,
        bt_config.timeframe
    );

    match run_backtest_pipeline(
        &data_port,
        strategy.as_ref(),
        &bt_config,
        &symbols,
        output_path.map(PathBuf::as_path),
        export_dir.map(PathBuf::as_path),
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Backtest every symbol, print per-symbol failures, and emit the report to
/// `output_path` or stdout. Fails only when no symbol produced a result.
pub fn run_backtest_pipeline(
    data_port: &(dyn DataPort + Sync),
    strategy: &dyn Strategy,
    bt_config: &BacktestConfig,
    symbols: &[String],
    output_path: Option<&Path>,
    export_dir: Option<&Path>,
) -> Result<BatchOutcome, SignalbtError> {
    let outcome = run_batch(data_port, symbols, strategy, bt_config);

    for failure in &outcome.failures {
        eprintln!("warning: skipping {} ({})", failure.symbol, failure.error);
    }
    if outcome.is_empty() {
        return Err(SignalbtError::EmptyResultSet);
    }

    if let Some(dir) = export_dir {
        for result in outcome.results.values() {
            let paths = export_result(dir, result)?;
            for path in paths {
                eprintln!("  exported {}", path.display());
            }
        }
    }

    let reporter = TextReportAdapter::new();
    match output_path {
        Some(path) => {
            reporter.write(&outcome.results, bt_config, &path.to_string_lossy())?;
            eprintln!("\nReport written to: {}", path.display());
        }
        None => println!("{}", reporter.render(&outcome.results, bt_config)),
    }

    Ok(outcome)
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        return fail(&e);
    }
    eprintln!("Config validated successfully");

    let (strategy, bt_config, symbols) = match (
        build_strategy(&adapter),
        build_backtest_config(&adapter),
        resolve_symbols(None, &adapter),
    ) {
        (Ok(s), Ok(c), Ok(sym)) => (s, c, sym),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return fail(&e),
    };

    eprintln!("\nStrategy: {}", strategy.name());
    eprintln!("\nBacktest:");
    eprintln!("  period: {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  timeframe: {}", bt_config.timeframe);
    eprintln!("  initial capital: {:.2}", bt_config.initial_capital);
    eprintln!("  data dir: {}", data_adapter(&adapter).base_path().display());
    eprintln!("\nSymbols: {}", symbols.join(", "));

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

/// Latest bar's signal for one symbol, with sizing and protective levels
/// when it is a Buy.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSnapshot {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub signal: Signal,
    pub entry: Option<EntryPlan>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryPlan {
    pub size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

pub fn latest_signal(
    data_port: &dyn DataPort,
    strategy: &dyn Strategy,
    risk: &RiskManager,
    bt_config: &BacktestConfig,
    balance: f64,
    symbol: &str,
) -> Result<SignalSnapshot, SignalbtError> {
    let bars = data_port.fetch_bars(
        symbol,
        &bt_config.timeframe,
        bt_config.start_date,
        bt_config.end_date,
    )?;
    let Some(last) = bars.last() else {
        return Err(SignalbtError::NoData {
            symbol: symbol.to_string(),
        });
    };

    let signal = strategy
        .generate_signals(&bars)
        .last()
        .copied()
        .unwrap_or_default();
    let entry = (signal == Signal::Buy).then(|| EntryPlan {
        size: risk.position_size(balance, last.close),
        stop_loss: risk.stop_loss(last.close, Direction::Long),
        take_profit: risk.take_profit(last.close, Direction::Long),
    });

    Ok(SignalSnapshot {
        symbol: symbol.to_string(),
        timestamp: last.timestamp,
        price: last.close,
        signal,
        entry,
    })
}

fn run_signal(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        return fail(&e);
    }

    let (strategy, bt_config, symbols) = match (
        build_strategy(&adapter),
        build_backtest_config(&adapter),
        resolve_symbols(symbol_override, &adapter),
    ) {
        (Ok(s), Ok(c), Ok(sym)) => (s, c, sym),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return fail(&e),
    };

    let risk = RiskManager::new(build_risk_config(&adapter));
    let balance = adapter.get_double("risk", "balance", bt_config.initial_capital);
    let data_port = data_adapter(&adapter);

    eprintln!("Strategy: {}", strategy.name());
    let mut failed = 0usize;
    for symbol in &symbols {
        match latest_signal(&data_port, strategy.as_ref(), &risk, &bt_config, balance, symbol) {
            Ok(snap) => {
                println!(
                    "{}: {} @ {:.4} ({})",
                    snap.symbol, snap.signal, snap.price, snap.timestamp
                );
                if let Some(plan) = snap.entry {
                    println!(
                        "  size {:.6}, stop loss {:.4}, take profit {:.4}",
                        plan.size, plan.stop_loss, plan.take_profit
                    );
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("warning: {symbol}: {e}");
            }
        }
    }

    if failed == symbols.len() {
        return fail(&SignalbtError::EmptyResultSet);
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        return fail(&e);
    }
    match build_strategy(&adapter) {
        Ok(strategy) => eprintln!("  strategy: {}", strategy.name()),
        Err(e) => return fail(&e),
    }
    match resolve_symbols(None, &adapter) {
        Ok(symbols) => eprintln!("  symbols: {}", symbols.join(", ")),
        Err(e) => return fail(&e),
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

/// Cached `(first, last, count)` for `symbol`. An empty cache is `NoData`.
pub fn data_range(
    data_port: &dyn DataPort,
    symbol: &str,
    timeframe: &str,
) -> Result<(NaiveDateTime, NaiveDateTime, usize), SignalbtError> {
    data_port
        .get_data_range(symbol, timeframe)?
        .ok_or_else(|| SignalbtError::NoData {
            symbol: symbol.to_string(),
        })
}

fn run_info(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let symbols = match resolve_symbols(symbol_override, &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let timeframe = config
        .get_string("backtest", "timeframe")
        .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());
    let adapter = data_adapter(&config);

    let mut failed = 0usize;
    let mut last_err = None;
    for symbol in &symbols {
        match data_range(&adapter, symbol, &timeframe) {
            Ok((first, last, count)) => {
                println!("{symbol} [{timeframe}]: {count} bars, {first} to {last}");
            }
            Err(e) => {
                match &e {
                    SignalbtError::NoData { .. } => {
                        eprintln!("{symbol} [{timeframe}]: no data found")
                    }
                    _ => eprintln!("error querying {symbol}: {e}"),
                }
                failed += 1;
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if failed == symbols.len() => fail(&e),
        _ => ExitCode::SUCCESS,
    }
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let timeframe = config
        .get_string("backtest", "timeframe")
        .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());
    let adapter = data_adapter(&config);

    let symbols = match adapter.list_symbols(&timeframe) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    if symbols.is_empty() {
        eprintln!(
            "No symbols found for timeframe {} in {}",
            timeframe,
            adapter.base_path().display()
        );
    } else {
        for symbol in &symbols {
            println!("{symbol}");
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
