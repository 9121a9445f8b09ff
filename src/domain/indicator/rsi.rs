//! RSI (Relative Strength Index) indicator.
//!
//! Average gain/loss are simple rolling means over `period` bars. The first
//! bar has no prior close and contributes a zero change to the first window.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If both averages are 0 the ratio is undefined and the point is invalid.
//!
//! Warmup: first (period - 1) bars are invalid.

use crate::domain::indicator::{
    rolling_mean, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut gains = Vec::with_capacity(bars.len());
    let mut losses = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let change = if i == 0 {
            0.0
        } else {
            bar.close - bars[i - 1].close
        };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    let values = bars
        .iter()
        .zip(avg_gains.into_iter().zip(avg_losses))
        .map(|(bar, averages)| {
            let rsi = match averages {
                (Some(gain), Some(loss)) => rsi_from_averages(gain, loss),
                _ => None,
            };
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: rsi.is_some(),
                value: IndicatorValue::Simple(rsi.unwrap_or(0.0)),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return None;
        }
        return Some(100.0);
    }
    Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}
