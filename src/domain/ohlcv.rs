//! OHLCV bar representation.

use chrono::NaiveDateTime;

/// One OHLCV observation for a fixed interval. Sequences are sorted ascending
/// by `timestamp` with no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// close / prev_close - 1
    pub fn pct_change(&self, prev_close: f64) -> f64 {
        self.close / prev_close - 1.0
    }
}

/// Closing prices of `bars`, in order.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// True when every timestamp is strictly greater than the one before it.
pub fn is_strictly_ascending(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}
