//! Position state and trade records.

use chrono::NaiveDateTime;
use std::fmt;

/// An open long position. The simulation is long-only and all-in, so
/// quantity is implied by the running capital.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
}

impl OpenPosition {
    /// Percentage gain from entry to `price`.
    pub fn profit_pct(&self, price: f64) -> f64 {
        (price / self.entry_price - 1.0) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long(OpenPosition),
}

impl PositionState {
    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long(_))
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => f.write_str("buy"),
            TradeKind::Sell => f.write_str("sell"),
        }
    }
}

/// One side of a round trip. `profit_pct` is only present on sells.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub kind: TradeKind,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub capital: f64,
    pub profit_pct: Option<f64>,
}

impl TradeRecord {
    pub fn is_winning_sell(&self) -> bool {
        self.kind == TradeKind::Sell && self.profit_pct.is_some_and(|p| p > 0.0)
    }
}
