//! Signal-producing strategies.
//!
//! A strategy maps a bar slice to one [`Signal`] per bar. Implementations are
//! pure: the same bars always produce the same signals, and the output length
//! always equals the input length.

pub mod combined;
pub mod macd;
pub mod rsi;

pub use combined::CombinedStrategy;
pub use macd::MacdStrategy;
pub use rsi::RsiStrategy;

use crate::domain::backtest::MIN_BARS;
use crate::domain::error::SignalbtError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_PERIOD as DEFAULT_RSI_PERIOD;
use crate::domain::ohlcv::Bar;
use crate::domain::signal::Signal;
use crate::ports::config_port::ConfigPort;

pub trait Strategy: Send + Sync {
    /// Short human-readable label, e.g. `MACD(12,26,9)`.
    fn name(&self) -> String;

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal>;

    /// Fewest bars on which this strategy can emit anything but Hold.
    fn min_bars(&self) -> usize {
        MIN_BARS
    }
}

impl std::fmt::Debug for dyn Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// Build the strategy described by the `[strategy]` section. `kind` defaults
/// to `combined` with members `macd,rsi`.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<Box<dyn Strategy>, SignalbtError> {
    let kind = config
        .get_string("strategy", "kind")
        .unwrap_or_else(|| "combined".to_string())
        .trim()
        .to_lowercase();

    match kind.as_str() {
        "combined" => {
            let members = config
                .get_list("strategy", "members")
                .unwrap_or_else(|| vec!["macd".to_string(), "rsi".to_string()]);
            let mut combined = CombinedStrategy::new();
            for member in members {
                combined.add_strategy(build_single(config, &member.to_lowercase(), "members")?);
            }
            Ok(Box::new(combined))
        }
        other => build_single(config, other, "kind"),
    }
}

fn build_single(
    config: &dyn ConfigPort,
    kind: &str,
    key: &str,
) -> Result<Box<dyn Strategy>, SignalbtError> {
    match kind {
        "macd" => Ok(Box::new(MacdStrategy::new(
            period(config, "macd_fast", DEFAULT_FAST)?,
            period(config, "macd_slow", DEFAULT_SLOW)?,
            period(config, "macd_signal", DEFAULT_SIGNAL)?,
        ))),
        "rsi" => Ok(Box::new(RsiStrategy::new(
            period(config, "rsi_period", DEFAULT_RSI_PERIOD)?,
            config.get_double("strategy", "rsi_oversold", rsi::DEFAULT_OVERSOLD),
            config.get_double("strategy", "rsi_overbought", rsi::DEFAULT_OVERBOUGHT),
        ))),
        other => Err(SignalbtError::config_invalid(
            "strategy",
            key,
            format!("unknown strategy '{other}'"),
        )),
    }
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, SignalbtError> {
    let value = config.get_int("strategy", key, default as i64);
    match usize::try_from(value) {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(SignalbtError::config_invalid(
            "strategy",
            key,
            format!("{key} must be a positive integer"),
        )),
    }
}

/// `left` moved from at-or-below `right` to strictly above it.
pub(crate) fn crossed_above(prev: (f64, f64), curr: (f64, f64)) -> bool {
    curr.0 > curr.1 && prev.0 <= prev.1
}

/// `left` moved from at-or-above `right` to strictly below it.
pub(crate) fn crossed_below(prev: (f64, f64), curr: (f64, f64)) -> bool {
    curr.0 < curr.1 && prev.0 >= prev.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn cross_above_requires_touch_or_below_first() {
        assert!(crossed_above((1.0, 1.0), (2.0, 1.0)));
        assert!(crossed_above((0.5, 1.0), (1.5, 1.0)));
        assert!(!crossed_above((1.5, 1.0), (2.0, 1.0)));
        assert!(!crossed_above((0.5, 1.0), (1.0, 1.0)));
    }

    #[test]
    fn cross_below_requires_touch_or_above_first() {
        assert!(crossed_below((1.0, 1.0), (0.5, 1.0)));
        assert!(crossed_below((2.0, 1.0), (0.5, 1.0)));
        assert!(!crossed_below((0.5, 1.0), (0.2, 1.0)));
        assert!(!crossed_below((2.0, 1.0), (1.0, 1.0)));
    }

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn build_default_is_combined_macd_rsi() {
        let strategy = build_strategy(&config("[strategy]\n")).unwrap();
        assert_eq!(strategy.name(), "Combined[MACD(12,26,9), RSI(14,30,70)]");
    }

    #[test]
    fn build_single_kinds() {
        let macd = build_strategy(&config(
            "[strategy]\nkind = macd\nmacd_fast = 5\nmacd_slow = 10\nmacd_signal = 3\n",
        ))
        .unwrap();
        assert_eq!(macd.name(), "MACD(5,10,3)");

        let rsi = build_strategy(&config(
            "[strategy]\nkind = RSI\nrsi_period = 7\nrsi_oversold = 25\nrsi_overbought = 75\n",
        ))
        .unwrap();
        assert_eq!(rsi.name(), "RSI(7,25,75)");
    }

    #[test]
    fn build_combined_members_in_order() {
        let strategy =
            build_strategy(&config("[strategy]\nkind = combined\nmembers = rsi, macd\n")).unwrap();
        assert_eq!(strategy.name(), "Combined[RSI(14,30,70), MACD(12,26,9)]");
    }

    #[test]
    fn build_rejects_unknown_kind() {
        let err = build_strategy(&config("[strategy]\nkind = momentum\n")).unwrap_err();
        assert!(matches!(err, SignalbtError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn build_rejects_non_positive_period() {
        let err = build_strategy(&config("[strategy]\nkind = rsi\nrsi_period = -3\n")).unwrap_err();
        assert!(matches!(err, SignalbtError::ConfigInvalid { key, .. } if key == "rsi_period"));
    }

    #[test]
    fn nan_never_crosses() {
        assert!(!crossed_above((f64::NAN, 1.0), (2.0, 1.0)));
        assert!(!crossed_below((2.0, 1.0), (f64::NAN, 1.0)));
    }
}
