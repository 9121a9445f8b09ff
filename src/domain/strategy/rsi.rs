//! RSI threshold strategy.
//!
//! Buy on a rebound out of oversold (RSI rises through `oversold`), sell when
//! RSI falls back through `overbought`. Bars whose RSI, or whose previous
//! bar's RSI, is still in warmup are Hold.

use super::Strategy;
use crate::domain::indicator::rsi::{calculate_rsi, DEFAULT_PERIOD};
use crate::domain::ohlcv::Bar;
use crate::domain::signal::Signal;

pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RsiStrategy {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiStrategy {
    fn default() -> Self {
        RsiStrategy {
            period: DEFAULT_PERIOD,
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

impl RsiStrategy {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Self {
        RsiStrategy {
            period,
            oversold,
            overbought,
        }
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> String {
        format!("RSI({},{},{})", self.period, self.oversold, self.overbought)
    }

    // a crossing needs two consecutive settled RSI values
    fn min_bars(&self) -> usize {
        self.period + 1
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let series = calculate_rsi(bars, self.period);
        let rsi: Vec<Option<f64>> = series.values.iter().map(|p| p.simple()).collect();

        let mut signals = vec![Signal::Hold; bars.len()];
        for i in 1..rsi.len() {
            let (Some(prev), Some(curr)) = (rsi[i - 1], rsi[i]) else {
                continue;
            };
            if curr > self.oversold && prev <= self.oversold {
                signals[i] = Signal::Buy;
            } else if curr < self.overbought && prev >= self.overbought {
                signals[i] = Signal::Sell;
            }
        }

        signals
    }
}
