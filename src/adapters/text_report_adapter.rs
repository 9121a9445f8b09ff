//! Plain-text report adapter implementing ReportPort.
//!
//! Renders the per-symbol summary as a column-aligned table followed by the
//! cross-symbol averages.

use std::collections::BTreeMap;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::report::{summarize, Summary, SummaryRow};
use crate::ports::report_port::ReportPort;

pub const NO_RESULTS: &str = "No results available";

const HEADERS: [&str; 7] = [
    "Symbol",
    "Return (%)",
    "Annual (%)",
    "Sharpe",
    "Max DD (%)",
    "Win Rate (%)",
    "Trades",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        TextReportAdapter
    }
}

fn row_cells(row: &SummaryRow) -> Vec<String> {
    vec![
        row.symbol.clone(),
        format!("{:.2}", row.total_return_pct),
        format!("{:.2}", row.annualized_return_pct),
        format!("{:.2}", row.sharpe_ratio),
        format!("{:.2}", row.max_drawdown_pct),
        format!("{:.2}", row.win_rate_pct),
        row.trade_count.to_string(),
    ]
}

/// Left-aligned columns joined by ` | `, each padded to its widest cell, with
/// a dash rule the width of the header line.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header = join_cells(headers.iter().copied(), &widths);
    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.chars().count()));
    out.push('\n');
    for row in rows {
        out.push_str(&join_cells(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn render_summary(summary: &Summary, config: &BacktestConfig) -> String {
    let mut report = String::from("===== Backtest Results =====\n\n");
    report.push_str(&format!(
        "Period: {} to {}\n",
        config.start_date.format("%Y-%m-%d"),
        config.end_date.format("%Y-%m-%d")
    ));
    report.push_str(&format!("Timeframe: {}\n\n", config.timeframe));

    let rows: Vec<Vec<String>> = summary.rows.iter().map(row_cells).collect();
    report.push_str(&format_table(&HEADERS, &rows));
    report.push('\n');

    let avg = &summary.averages;
    report.push_str("Overall Performance:\n");
    report.push_str(&format!("Average Return: {:.2}%\n", avg.total_return_pct));
    report.push_str(&format!("Average Sharpe Ratio: {:.2}\n", avg.sharpe_ratio));
    report.push_str(&format!("Average Max Drawdown: {:.2}%\n", avg.max_drawdown_pct));
    report.push_str(&format!("Average Win Rate: {:.2}%\n", avg.win_rate_pct));
    report
}

impl ReportPort for TextReportAdapter {
    fn render(
        &self,
        results: &BTreeMap<String, BacktestResult>,
        config: &BacktestConfig,
    ) -> String {
        match summarize(results) {
            Ok(summary) => render_summary(&summary, config),
            Err(_) => NO_RESULTS.to_string(),
        }
    }
}
