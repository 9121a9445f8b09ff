//! Cross-symbol summary of backtest results.

use std::collections::BTreeMap;

use super::backtest::BacktestResult;
use super::error::SignalbtError;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub symbol: String,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    pub trade_count: usize,
}

/// Simple means over every row.
#[derive(Debug, Clone, PartialEq)]
pub struct Averages {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    pub trade_count: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
    pub averages: Averages,
}

pub fn summarize(results: &BTreeMap<String, BacktestResult>) -> Result<Summary, SignalbtError> {
    if results.is_empty() {
        return Err(SignalbtError::EmptyResultSet);
    }

    let rows: Vec<SummaryRow> = results
        .iter()
        .map(|(symbol, result)| {
            let m = &result.metrics;
            SummaryRow {
                symbol: symbol.clone(),
                total_return_pct: m.total_return_pct,
                annualized_return_pct: m.annualized_return_pct,
                sharpe_ratio: m.sharpe_ratio,
                max_drawdown_pct: m.max_drawdown_pct,
                win_rate_pct: m.win_rate_pct,
                trade_count: m.trade_count,
            }
        })
        .collect();

    let n = rows.len() as f64;
    let mean = |f: fn(&SummaryRow) -> f64| rows.iter().map(f).sum::<f64>() / n;
    let averages = Averages {
        total_return_pct: mean(|r| r.total_return_pct),
        annualized_return_pct: mean(|r| r.annualized_return_pct),
        sharpe_ratio: mean(|r| r.sharpe_ratio),
        max_drawdown_pct: mean(|r| r.max_drawdown_pct),
        win_rate_pct: mean(|r| r.win_rate_pct),
        trade_count: mean(|r| r.trade_count as f64),
    };

    Ok(Summary { rows, averages })
}
