//! Single-position account: running capital, trade log, and capital history.

use chrono::NaiveDateTime;

use super::ohlcv::Bar;
use super::position::{OpenPosition, PositionState, TradeKind, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct CapitalPoint {
    pub timestamp: NaiveDateTime,
    pub capital: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub initial_capital: f64,
    pub capital: f64,
    pub position: PositionState,
    pub trades: Vec<TradeRecord>,
    pub capital_history: Vec<CapitalPoint>,
}

impl Account {
    pub fn new(initial_capital: f64) -> Self {
        Account {
            initial_capital,
            capital: initial_capital,
            position: PositionState::Flat,
            trades: Vec::new(),
            capital_history: Vec::new(),
        }
    }

    /// Revalue an open position by the bar's close-to-close change.
    /// No-op while flat.
    pub fn mark_to_market(&mut self, bar: &Bar, prev_close: f64) {
        if self.position.is_long() {
            self.capital *= 1.0 + bar.pct_change(prev_close);
        }
    }

    /// Go long at the bar's close. Returns the recorded trade, or `None` if
    /// already long.
    pub fn open_long(&mut self, bar: &Bar) -> Option<&TradeRecord> {
        if self.position.is_long() {
            return None;
        }
        self.position = PositionState::Long(OpenPosition {
            entry_price: bar.close,
            entry_time: bar.timestamp,
        });
        self.trades.push(TradeRecord {
            kind: TradeKind::Buy,
            timestamp: bar.timestamp,
            price: bar.close,
            capital: self.capital,
            profit_pct: None,
        });
        self.trades.last()
    }

    /// Exit the open position at the bar's close. Returns the recorded trade,
    /// or `None` if flat.
    pub fn close_long(&mut self, bar: &Bar) -> Option<&TradeRecord> {
        let PositionState::Long(open) = self.position else {
            return None;
        };
        self.position = PositionState::Flat;
        self.trades.push(TradeRecord {
            kind: TradeKind::Sell,
            timestamp: bar.timestamp,
            price: bar.close,
            capital: self.capital,
            profit_pct: Some(open.profit_pct(bar.close)),
        });
        self.trades.last()
    }

    pub fn record_capital(&mut self, timestamp: NaiveDateTime) {
        self.capital_history.push(CapitalPoint {
            timestamp,
            capital: self.capital,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    #[test]
    fn new_account() {
        let account = Account::new(10_000.0);
        assert!((account.capital - 10_000.0).abs() < f64::EPSILON);
        assert!((account.initial_capital - 10_000.0).abs() < f64::EPSILON);
        assert!(account.position.is_flat());
        assert!(account.trades.is_empty());
        assert!(account.capital_history.is_empty());
    }

    #[test]
    fn mark_to_market_only_when_long() {
        let bars = make_bars(&[100.0, 110.0, 121.0]);
        let mut account = Account::new(1_000.0);

        account.mark_to_market(&bars[1], bars[0].close);
        assert!((account.capital - 1_000.0).abs() < f64::EPSILON);

        account.open_long(&bars[1]);
        account.mark_to_market(&bars[2], bars[1].close);
        assert!((account.capital - 1_100.0).abs() < 1e-9);
    }

    #[test]
    fn open_long_records_unmarked_capital() {
        let bars = make_bars(&[100.0, 110.0]);
        let mut account = Account::new(1_000.0);

        let trade = account.open_long(&bars[1]).cloned().unwrap();
        assert_eq!(trade.kind, TradeKind::Buy);
        assert_eq!(trade.price, 110.0);
        assert_eq!(trade.capital, 1_000.0);
        assert_eq!(trade.profit_pct, None);
        assert!(account.position.is_long());
    }

    #[test]
    fn open_long_twice_is_noop() {
        let bars = make_bars(&[100.0, 110.0]);
        let mut account = Account::new(1_000.0);
        assert!(account.open_long(&bars[0]).is_some());
        assert!(account.open_long(&bars[1]).is_none());
        assert_eq!(account.trades.len(), 1);
    }

    #[test]
    fn close_long_records_profit() {
        let bars = make_bars(&[100.0, 120.0]);
        let mut account = Account::new(1_000.0);
        account.open_long(&bars[0]);
        account.mark_to_market(&bars[1], bars[0].close);

        let trade = account.close_long(&bars[1]).cloned().unwrap();
        assert_eq!(trade.kind, TradeKind::Sell);
        assert!((trade.capital - 1_200.0).abs() < 1e-9);
        assert!((trade.profit_pct.unwrap() - 20.0).abs() < 1e-9);
        assert!(account.position.is_flat());
    }

    #[test]
    fn close_while_flat_is_noop() {
        let bars = make_bars(&[100.0]);
        let mut account = Account::new(1_000.0);
        assert!(account.close_long(&bars[0]).is_none());
        assert!(account.trades.is_empty());
    }

    #[test]
    fn record_capital_appends() {
        let bars = make_bars(&[100.0, 101.0]);
        let mut account = Account::new(500.0);
        account.record_capital(bars[0].timestamp);
        account.record_capital(bars[1].timestamp);

        assert_eq!(account.capital_history.len(), 2);
        assert_eq!(account.capital_history[1].timestamp, bars[1].timestamp);
        assert!((account.capital_history[1].capital - 500.0).abs() < f64::EPSILON);
    }
}
