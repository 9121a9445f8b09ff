//! Equity curve construction and performance metrics.

use chrono::NaiveDateTime;

use super::account::CapitalPoint;
use super::position::TradeRecord;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// One bar of the capital curve with its derived return and drawdown columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub capital: f64,
    /// Simple return versus the previous bar. `None` on the baseline bar.
    pub returns: Option<f64>,
    pub cumulative_return: f64,
    pub running_max: f64,
    pub drawdown: f64,
    pub drawdown_pct: f64,
}

/// Derive the equity curve from the per-bar capital history. The first point
/// is the baseline with a cumulative return of 1.0.
pub fn build_equity_curve(history: &[CapitalPoint]) -> Vec<EquityPoint> {
    let mut curve: Vec<EquityPoint> = Vec::with_capacity(history.len());

    for (i, point) in history.iter().enumerate() {
        let returns = (i > 0).then(|| simple_return(history[i - 1].capital, point.capital));
        let (cumulative_return, running_max) = match curve.last() {
            Some(prev) => {
                let cum = prev.cumulative_return * (1.0 + returns.unwrap_or(0.0));
                (cum, prev.running_max.max(cum))
            }
            None => (1.0, 1.0),
        };
        let drawdown = running_max - cumulative_return;
        let drawdown_pct = if running_max > 0.0 {
            drawdown / running_max
        } else {
            0.0
        };

        curve.push(EquityPoint {
            timestamp: point.timestamp,
            capital: point.capital,
            returns,
            cumulative_return,
            running_max,
            drawdown,
            drawdown_pct,
        });
    }

    curve
}

fn simple_return(prev: f64, curr: f64) -> f64 {
    if prev > 0.0 { (curr - prev) / prev } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    pub trade_count: usize,
}

impl Metrics {
    pub fn compute(
        initial_capital: f64,
        equity_curve: &[EquityPoint],
        trades: &[TradeRecord],
    ) -> Self {
        let final_capital = equity_curve
            .last()
            .map(|p| p.capital)
            .unwrap_or(initial_capital);

        let total_return_pct = if initial_capital > 0.0 {
            (final_capital / initial_capital - 1.0) * 100.0
        } else {
            0.0
        };

        let days = match (equity_curve.first(), equity_curve.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_days(),
            _ => 0,
        };

        let returns: Vec<f64> = equity_curve.iter().filter_map(|p| p.returns).collect();

        let max_drawdown_pct = equity_curve
            .iter()
            .map(|p| p.drawdown_pct)
            .fold(0.0_f64, f64::max)
            * 100.0;

        let trade_count = trades.len() / 2;
        let winning = trades.iter().filter(|t| t.is_winning_sell()).count();
        let win_rate_pct = if trade_count > 0 {
            winning as f64 / trade_count as f64 * 100.0
        } else {
            0.0
        };

        Metrics {
            total_return_pct,
            annualized_return_pct: annualized_return_pct(total_return_pct, days),
            sharpe_ratio: sharpe_ratio(&returns),
            max_drawdown_pct,
            win_rate_pct,
            trade_count,
        }
    }
}

/// Compound `total_return_pct` over `days` calendar days to a yearly rate.
/// Zero when the span is empty.
pub fn annualized_return_pct(total_return_pct: f64, days: i64) -> f64 {
    if days <= 0 {
        return 0.0;
    }
    let growth = 1.0 + total_return_pct / 100.0;
    let annualized = (growth.powf(CALENDAR_DAYS_PER_YEAR / days as f64) - 1.0) * 100.0;
    if annualized.is_finite() { annualized } else { 0.0 }
}

/// Annualized Sharpe ratio from per-bar returns using the sample standard
/// deviation. Zero with fewer than two returns or no dispersion.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    if std_dev > 0.0 {
        mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::TradeKind;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn history(capitals: &[f64]) -> Vec<CapitalPoint> {
        capitals
            .iter()
            .enumerate()
            .map(|(i, &capital)| CapitalPoint {
                timestamp: ts(i as u32 + 1),
                capital,
            })
            .collect()
    }

    fn trade(kind: TradeKind, day: u32, profit_pct: Option<f64>) -> TradeRecord {
        TradeRecord {
            kind,
            timestamp: ts(day),
            price: 100.0,
            capital: 1000.0,
            profit_pct,
        }
    }

    #[test]
    fn baseline_point() {
        let curve = build_equity_curve(&history(&[1000.0]));
        assert_eq!(curve.len(), 1);
        assert_eq!(curve[0].returns, None);
        assert!((curve[0].cumulative_return - 1.0).abs() < f64::EPSILON);
        assert!((curve[0].running_max - 1.0).abs() < f64::EPSILON);
        assert!(curve[0].drawdown.abs() < f64::EPSILON);
    }

    #[test]
    fn curve_columns() {
        let curve = build_equity_curve(&history(&[1000.0, 1100.0, 990.0, 1210.0]));

        assert!((curve[1].returns.unwrap() - 0.1).abs() < 1e-12);
        assert!((curve[2].returns.unwrap() + 0.1).abs() < 1e-12);
        assert!((curve[2].cumulative_return - 0.99).abs() < 1e-12);
        assert!((curve[2].running_max - 1.1).abs() < 1e-12);
        assert!((curve[2].drawdown - 0.11).abs() < 1e-12);
        assert!((curve[2].drawdown_pct - 0.1).abs() < 1e-12);
        assert!((curve[3].cumulative_return - 1.21).abs() < 1e-12);
        assert!(curve[3].drawdown.abs() < 1e-12);
    }

    #[test]
    fn empty_history() {
        assert!(build_equity_curve(&[]).is_empty());
        let m = Metrics::compute(1000.0, &[], &[]);
        assert!(m.total_return_pct.abs() < f64::EPSILON);
        assert!(m.annualized_return_pct.abs() < f64::EPSILON);
        assert!(m.sharpe_ratio.abs() < f64::EPSILON);
        assert_eq!(m.trade_count, 0);
    }

    #[test]
    fn total_and_drawdown() {
        let curve = build_equity_curve(&history(&[1000.0, 1100.0, 990.0, 1210.0]));
        let m = Metrics::compute(1000.0, &curve, &[]);
        assert!((m.total_return_pct - 21.0).abs() < 1e-9);
        assert!((m.max_drawdown_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn non_decreasing_curve_has_no_drawdown() {
        let curve = build_equity_curve(&history(&[1000.0, 1000.0, 1050.0, 1200.0]));
        let m = Metrics::compute(1000.0, &curve, &[]);
        assert!(m.max_drawdown_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn annualized_over_a_year() {
        assert!((annualized_return_pct(10.0, 365) - 10.0).abs() < 1e-9);
        let half_year = annualized_return_pct(10.0, 365 / 2 + 1);
        assert!(half_year > 20.0);
    }

    #[test]
    fn annualized_zero_days() {
        assert!(annualized_return_pct(50.0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn sharpe_degenerate_cases() {
        assert!(sharpe_ratio(&[]).abs() < f64::EPSILON);
        assert!(sharpe_ratio(&[0.05]).abs() < f64::EPSILON);
        assert!(sharpe_ratio(&[0.01, 0.01, 0.01]).abs() < f64::EPSILON);
    }

    #[test]
    fn sharpe_sample_std() {
        // mean 0.01, sample std 0.01
        let s = sharpe_ratio(&[0.0, 0.01, 0.02]);
        assert!((s - 252.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn win_rate_zero_without_trades() {
        let curve = build_equity_curve(&history(&[1000.0, 1000.0]));
        let m = Metrics::compute(1000.0, &curve, &[]);
        assert_eq!(m.trade_count, 0);
        assert_eq!(m.win_rate_pct, 0.0);
    }

    #[test]
    fn win_rate_zero_with_dangling_buy() {
        let curve = build_equity_curve(&history(&[1000.0, 1000.0]));
        let trades = vec![trade(TradeKind::Buy, 2, None)];
        let m = Metrics::compute(1000.0, &curve, &trades);
        assert_eq!(m.trade_count, 0);
        assert_eq!(m.win_rate_pct, 0.0);
    }

    #[test]
    fn win_rate_counts_profitable_sells() {
        let curve = build_equity_curve(&history(&[1000.0; 5]));
        let trades = vec![
            trade(TradeKind::Buy, 1, None),
            trade(TradeKind::Sell, 2, Some(4.0)),
            trade(TradeKind::Buy, 3, None),
            trade(TradeKind::Sell, 4, Some(-2.0)),
            trade(TradeKind::Buy, 5, None),
        ];
        let m = Metrics::compute(1000.0, &curve, &trades);
        assert_eq!(m.trade_count, 2);
        assert!((m.win_rate_pct - 50.0).abs() < 1e-9);
    }
}
