//! CSV export of trade logs and equity curves for external plotting.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SignalbtError;
use crate::domain::metrics::EquityPoint;
use crate::domain::position::TradeRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
struct TradeRow {
    timestamp: String,
    kind: String,
    price: f64,
    capital: f64,
    profit_pct: Option<f64>,
}

#[derive(Serialize)]
struct EquityRow {
    timestamp: String,
    capital: f64,
    returns: Option<f64>,
    cumulative_return: f64,
    running_max: f64,
    drawdown: f64,
    drawdown_pct: f64,
}

fn csv_error(path: &Path, e: csv::Error) -> SignalbtError {
    SignalbtError::DataSource {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn write_rows<T: Serialize>(
    path: &Path,
    rows: impl Iterator<Item = T>,
) -> Result<(), SignalbtError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for row in rows {
        wtr.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Columns: `timestamp,kind,price,capital,profit_pct`. `profit_pct` is empty
/// on buys.
pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<(), SignalbtError> {
    write_rows(
        path,
        trades.iter().map(|t| TradeRow {
            timestamp: t.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            kind: t.kind.to_string(),
            price: t.price,
            capital: t.capital,
            profit_pct: t.profit_pct,
        }),
    )
}

pub fn write_equity_csv(path: &Path, curve: &[EquityPoint]) -> Result<(), SignalbtError> {
    write_rows(
        path,
        curve.iter().map(|p| EquityRow {
            timestamp: p.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            capital: p.capital,
            returns: p.returns,
            cumulative_return: p.cumulative_return,
            running_max: p.running_max,
            drawdown: p.drawdown,
            drawdown_pct: p.drawdown_pct,
        }),
    )
}

/// Write `{symbol}_trades.csv` and `{symbol}_equity.csv` under `dir`,
/// creating it if needed. Returns the paths written.
pub fn export_result(dir: &Path, result: &BacktestResult) -> Result<Vec<PathBuf>, SignalbtError> {
    std::fs::create_dir_all(dir)?;
    let trades = dir.join(format!("{}_trades.csv", result.symbol));
    let equity = dir.join(format!("{}_equity.csv", result.symbol));
    write_trades_csv(&trades, &result.trades)?;
    write_equity_csv(&equity, &result.equity_curve)?;
    Ok(vec![trades, equity])
}
