//! Long-only, all-in backtest simulation.
//!
//! Bar 0 seeds the run. For every later bar an open position is marked to
//! market first, then the bar's signal is applied at its close. A Buy while
//! long or a Sell while flat is ignored.

use chrono::NaiveDate;
use tracing::debug;

use super::account::Account;
use super::error::SignalbtError;
use super::metrics::{build_equity_curve, EquityPoint, Metrics};
use super::ohlcv::{is_strictly_ascending, Bar};
use super::position::TradeRecord;
use super::signal::Signal;
use super::strategy::Strategy;

/// Fewest bars a run can be simulated on.
pub const MIN_BARS: usize = 2;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_TIMEFRAME: &str = "15m";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timeframe: String,
}

impl BacktestConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            start_date,
            end_date,
            timeframe: DEFAULT_TIMEFRAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub symbol: String,
    pub strategy: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub metrics: Metrics,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
}

/// Simulate `signals` over `bars` and compute the run's metrics.
pub fn run_backtest(
    symbol: &str,
    bars: &[Bar],
    signals: &[Signal],
    config: &BacktestConfig,
) -> Result<BacktestResult, SignalbtError> {
    validate_inputs(symbol, bars, signals)?;

    let mut account = Account::new(config.initial_capital);
    account.record_capital(bars[0].timestamp);

    for i in 1..bars.len() {
        let bar = &bars[i];
        account.mark_to_market(bar, bars[i - 1].close);

        let trade = match signals[i] {
            Signal::Buy => account.open_long(bar),
            Signal::Sell => account.close_long(bar),
            Signal::Hold => None,
        };
        if let Some(trade) = trade {
            debug!(
                symbol,
                kind = %trade.kind,
                timestamp = %trade.timestamp,
                price = trade.price,
                capital = trade.capital,
                profit_pct = trade.profit_pct,
                "trade"
            );
        }

        account.record_capital(bar.timestamp);
    }

    let equity_curve = build_equity_curve(&account.capital_history);
    let metrics = Metrics::compute(config.initial_capital, &equity_curve, &account.trades);

    Ok(BacktestResult {
        symbol: symbol.to_string(),
        strategy: String::new(),
        initial_capital: config.initial_capital,
        final_capital: account.capital,
        metrics,
        trades: account.trades,
        equity_curve,
    })
}

/// Generate signals with `strategy` and simulate them.
pub fn backtest_strategy(
    symbol: &str,
    bars: &[Bar],
    strategy: &dyn Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, SignalbtError> {
    let minimum = strategy.min_bars();
    if bars.len() < minimum {
        return Err(SignalbtError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum,
        });
    }
    let signals = strategy.generate_signals(bars);
    let mut result = run_backtest(symbol, bars, &signals, config)?;
    result.strategy = strategy.name();
    Ok(result)
}

fn validate_inputs(symbol: &str, bars: &[Bar], signals: &[Signal]) -> Result<(), SignalbtError> {
    if bars.len() < MIN_BARS {
        return Err(SignalbtError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }
    if signals.len() != bars.len() {
        return Err(SignalbtError::MisalignedSeries {
            symbol: symbol.to_string(),
            reason: format!("{} signals for {} bars", signals.len(), bars.len()),
        });
    }
    if !is_strictly_ascending(bars) {
        return Err(SignalbtError::MisalignedSeries {
            symbol: symbol.to_string(),
            reason: "timestamps are not strictly ascending".into(),
        });
    }
    Ok(())
}
