//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Both EMAs seed from the first close, so every bar carries a value.

use crate::domain::indicator::{
    ema_values, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::{closes, Bar};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if bars.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let closes = closes(bars);
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal_period);

    let values = bars
        .iter()
        .zip(macd_line.iter().zip(&signal_line))
        .map(|(bar, (&line, &signal))| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Macd {
                line,
                signal,
                histogram: line - signal,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[Bar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// (line, signal) pairs of a MACD series, in order. Non-MACD points are skipped.
pub fn line_and_signal(series: &IndicatorSeries) -> Vec<(f64, f64)> {
    series
        .values
        .iter()
        .filter_map(|p| match p.value {
            IndicatorValue::Macd { line, signal, .. } => Some((line, signal)),
            IndicatorValue::Simple(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    fn rising_bars(n: usize) -> Vec<Bar> {
        let prices: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        make_bars(&prices)
    }

    #[test]
    fn macd_every_point_valid() {
        let series = calculate_macd_default(&rising_bars(40));
        assert_eq!(series.values.len(), 40);
        assert!(series.values.iter().all(|p| p.valid));
    }

    #[test]
    fn macd_first_bar_is_zero() {
        let series = calculate_macd_default(&rising_bars(5));
        let (line, signal) = line_and_signal(&series)[0];
        assert!(line.abs() < f64::EPSILON);
        assert!(signal.abs() < f64::EPSILON);
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let series = calculate_macd_default(&rising_bars(40));

        for point in &series.values {
            if let IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } = point.value
            {
                assert!((histogram - (line - signal)).abs() < f64::EPSILON);
            } else {
                panic!("Expected Macd value");
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0]);
        let series = calculate_macd(&bars, 3, 5, 2);

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let ema_fast = ema_values(&closes, 3);
        let ema_slow = ema_values(&closes, 5);

        for (i, (line, _)) in line_and_signal(&series).into_iter().enumerate() {
            assert!(
                (line - (ema_fast[i] - ema_slow[i])).abs() < f64::EPSILON,
                "MACD line mismatch at index {}",
                i
            );
        }
    }

    #[test]
    fn macd_signal_is_ema_of_line() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 15.0, 14.0, 18.0]);
        let series = calculate_macd(&bars, 2, 4, 3);
        let pairs = line_and_signal(&series);

        let lines: Vec<f64> = pairs.iter().map(|(l, _)| *l).collect();
        let expected = ema_values(&lines, 3);
        for (i, (_, signal)) in pairs.iter().enumerate() {
            assert!((signal - expected[i]).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let series = calculate_macd_default(&rising_bars(40));
        let (line, _) = line_and_signal(&series)[39];
        assert!(line > 0.0);
    }

    #[test]
    fn macd_indicator_type() {
        let series = calculate_macd(&rising_bars(3), 5, 10, 3);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Macd {
                fast: 5,
                slow: 10,
                signal: 3
            }
        );
    }

    #[test]
    fn macd_empty_bars() {
        assert!(calculate_macd_default(&[]).values.is_empty());
    }

    #[test]
    fn macd_zero_period() {
        let bars = rising_bars(3);
        assert!(calculate_macd(&bars, 0, 26, 9).values.is_empty());
        assert!(calculate_macd(&bars, 12, 0, 9).values.is_empty());
        assert!(calculate_macd(&bars, 12, 26, 0).values.is_empty());
    }

    #[test]
    fn macd_default_constants() {
        assert_eq!(DEFAULT_FAST, 12);
        assert_eq!(DEFAULT_SLOW, 26);
        assert_eq!(DEFAULT_SIGNAL, 9);
    }
}
