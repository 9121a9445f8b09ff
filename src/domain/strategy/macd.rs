//! MACD crossover strategy.

use super::{crossed_above, crossed_below, Strategy};
use crate::domain::indicator::macd::{
    calculate_macd, line_and_signal, DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW,
};
use crate::domain::ohlcv::Bar;
use crate::domain::signal::Signal;

/// Buy when the MACD line crosses above its signal line, sell on the
/// downward cross.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdStrategy {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdStrategy {
    fn default() -> Self {
        MacdStrategy {
            fast_period: DEFAULT_FAST,
            slow_period: DEFAULT_SLOW,
            signal_period: DEFAULT_SIGNAL,
        }
    }
}

impl MacdStrategy {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        MacdStrategy {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Strategy for MacdStrategy {
    fn name(&self) -> String {
        format!(
            "MACD({},{},{})",
            self.fast_period, self.slow_period, self.signal_period
        )
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let series = calculate_macd(
            bars,
            self.fast_period,
            self.slow_period,
            self.signal_period,
        );
        let pairs = line_and_signal(&series);

        let mut signals = vec![Signal::Hold; bars.len()];
        if pairs.len() != bars.len() {
            return signals;
        }

        for i in 1..pairs.len() {
            if crossed_above(pairs[i - 1], pairs[i]) {
                signals[i] = Signal::Buy;
            } else if crossed_below(pairs[i - 1], pairs[i]) {
                signals[i] = Signal::Sell;
            }
        }

        signals
    }
}
