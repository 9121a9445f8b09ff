//! Configuration validation.
//!
//! Validates all config fields before a backtest or signal scan runs.

use crate::domain::backtest::DEFAULT_INITIAL_CAPITAL;
use crate::domain::batch::parse_symbols;
use crate::domain::error::SignalbtError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_PERIOD as DEFAULT_RSI_PERIOD;
use crate::domain::risk::{
    DEFAULT_MAX_POSITION_SIZE, DEFAULT_STOP_LOSS_PCT, DEFAULT_TAKE_PROFIT_PCT,
};
use crate::domain::strategy::rsi::{DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_SYMBOLS: &str = "BTC-USDT";
pub const DEFAULT_DATA_DIR: &str = "./data";

const STRATEGY_KINDS: [&str; 3] = ["macd", "rsi", "combined"];
const MEMBER_KINDS: [&str; 2] = ["macd", "rsi"];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    validate_initial_capital(config)?;
    validate_dates(config)?;
    validate_timeframe(config)?;
    validate_symbols(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    validate_kind(config)?;
    validate_macd_periods(config)?;
    validate_rsi_params(config)?;
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    let size = read_double(config, "risk", "max_position_size", DEFAULT_MAX_POSITION_SIZE)?;
    if size <= 0.0 || size > 1.0 {
        return Err(SignalbtError::config_invalid(
            "risk",
            "max_position_size",
            "max_position_size must be between 0 and 1",
        ));
    }
    for (key, default) in [
        ("stop_loss_pct", DEFAULT_STOP_LOSS_PCT),
        ("take_profit_pct", DEFAULT_TAKE_PROFIT_PCT),
    ] {
        let value = read_double(config, "risk", key, default)?;
        if !(0.0..1.0).contains(&value) {
            return Err(SignalbtError::config_invalid(
                "risk",
                key,
                format!("{key} must be a fraction in [0, 1)"),
            ));
        }
    }
    if read_double(config, "risk", "balance", 0.0)? < 0.0 {
        return Err(SignalbtError::config_invalid(
            "risk",
            "balance",
            "balance must be non-negative",
        ));
    }
    Ok(())
}

/// Finite float at `[section] key`, or `default` when absent. Unparseable
/// text and NaN/infinite values are rejected rather than defaulted.
fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SignalbtError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SignalbtError::config_invalid(
            section,
            key,
            format!("{key} must be a finite number, got '{}'", raw.trim()),
        )),
    }
}

fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, SignalbtError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    raw.trim().parse::<i64>().map_err(|_| {
        SignalbtError::config_invalid(
            section,
            key,
            format!("{key} must be an integer, got '{}'", raw.trim()),
        )
    })
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    let value = read_double(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;
    if value <= 0.0 {
        return Err(SignalbtError::config_invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date >= end_date {
        return Err(SignalbtError::config_invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

/// Required `[backtest]` date in `YYYY-MM-DD` form.
pub fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, SignalbtError> {
    match config.get_string("backtest", field) {
        None => Err(SignalbtError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SignalbtError::config_invalid(
                "backtest",
                field,
                format!("invalid {field} format, expected YYYY-MM-DD"),
            )
        }),
    }
}

fn validate_timeframe(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    match config.get_string("backtest", "timeframe") {
        Some(s) if s.trim().is_empty() => Err(SignalbtError::config_invalid(
            "backtest",
            "timeframe",
            "timeframe must not be empty",
        )),
        _ => Ok(()),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    let raw = config
        .get_string("backtest", "symbols")
        .unwrap_or_else(|| DEFAULT_SYMBOLS.to_string());
    parse_symbols(&raw)
        .map(|_| ())
        .map_err(|e| SignalbtError::config_invalid("backtest", "symbols", e.to_string()))
}

fn validate_kind(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    let kind = config
        .get_string("strategy", "kind")
        .unwrap_or_else(|| "combined".to_string())
        .trim()
        .to_lowercase();
    if !STRATEGY_KINDS.contains(&kind.as_str()) {
        return Err(SignalbtError::config_invalid(
            "strategy",
            "kind",
            format!("unknown strategy kind '{kind}', expected one of macd, rsi, combined"),
        ));
    }

    if kind == "combined" {
        if let Some(members) = config.get_list("strategy", "members") {
            if members.is_empty() {
                return Err(SignalbtError::config_invalid(
                    "strategy",
                    "members",
                    "combined strategy needs at least one member",
                ));
            }
            if let Some(bad) = members
                .iter()
                .find(|m| !MEMBER_KINDS.contains(&m.to_lowercase().as_str()))
            {
                return Err(SignalbtError::config_invalid(
                    "strategy",
                    "members",
                    format!("unknown member '{bad}', expected macd or rsi"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_macd_periods(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    let fast = read_int(config, "strategy", "macd_fast", DEFAULT_FAST as i64)?;
    let slow = read_int(config, "strategy", "macd_slow", DEFAULT_SLOW as i64)?;
    let signal = read_int(config, "strategy", "macd_signal", DEFAULT_SIGNAL as i64)?;

    for (key, value) in [("macd_fast", fast), ("macd_slow", slow), ("macd_signal", signal)] {
        if value < 1 {
            return Err(SignalbtError::config_invalid(
                "strategy",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }
    if fast >= slow {
        return Err(SignalbtError::config_invalid(
            "strategy",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

fn validate_rsi_params(config: &dyn ConfigPort) -> Result<(), SignalbtError> {
    if read_int(config, "strategy", "rsi_period", DEFAULT_RSI_PERIOD as i64)? < 1 {
        return Err(SignalbtError::config_invalid(
            "strategy",
            "rsi_period",
            "rsi_period must be at least 1",
        ));
    }

    let oversold = read_double(config, "strategy", "rsi_oversold", DEFAULT_OVERSOLD)?;
    let overbought = read_double(config, "strategy", "rsi_overbought", DEFAULT_OVERBOUGHT)?;
    for (key, value) in [("rsi_oversold", oversold), ("rsi_overbought", overbought)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(SignalbtError::config_invalid(
                "strategy",
                key,
                format!("{key} must be between 0 and 100"),
            ));
        }
    }
    if oversold >= overbought {
        return Err(SignalbtError::config_invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought",
        ));
    }
    Ok(())
}
