//! Multi-symbol backtesting.
//!
//! Symbols run in parallel on the rayon pool. Each worker fetches its own
//! bars and shares the strategy read-only. A failing symbol is recorded and
//! skipped; it never aborts the rest of the batch.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::{info, warn};

use super::backtest::{backtest_strategy, BacktestConfig, BacktestResult};
use super::error::SignalbtError;
use super::strategy::Strategy;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parse a comma-separated symbol list, trimming and upper-casing each entry.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: SignalbtError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: BTreeMap<String, BacktestResult>,
    pub failures: Vec<SymbolFailure>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Backtest `strategy` on every symbol in `symbols`.
pub fn run_batch(
    data: &(dyn DataPort + Sync),
    symbols: &[String],
    strategy: &dyn Strategy,
    config: &BacktestConfig,
) -> BatchOutcome {
    let outcomes: Vec<(String, Result<BacktestResult, SignalbtError>)> = symbols
        .par_iter()
        .map(|symbol| (symbol.clone(), run_symbol(data, symbol, strategy, config)))
        .collect();

    let mut batch = BatchOutcome::default();
    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                batch.results.insert(symbol, result);
            }
            Err(error) => {
                warn!(%symbol, %error, "skipping symbol");
                batch.failures.push(SymbolFailure { symbol, error });
            }
        }
    }

    if !batch.failures.is_empty() {
        info!(
            completed = batch.results.len(),
            total = symbols.len(),
            "batch finished with skipped symbols"
        );
    }

    batch
}

/// Fetch and backtest a single symbol.
pub fn run_symbol(
    data: &(dyn DataPort + Sync),
    symbol: &str,
    strategy: &dyn Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, SignalbtError> {
    let bars = data.fetch_bars(symbol, &config.timeframe, config.start_date, config.end_date)?;
    if bars.is_empty() {
        return Err(SignalbtError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let result = backtest_strategy(symbol, &bars, strategy, config)?;
    info!(
        symbol,
        bars = bars.len(),
        total_return_pct = result.metrics.total_return_pct,
        trades = result.metrics.trade_count,
        "backtest complete"
    );
    Ok(result)
}
