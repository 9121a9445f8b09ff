//! Position sizing and protective price levels.
//!
//! This sits beside the backtest rather than inside it: the simulation always
//! goes all-in and never exits on a stop. The `signal` command uses it to
//! report sizing and levels for a fresh entry.

use std::collections::HashMap;
use std::fmt;

use crate::domain::signal::Signal;

pub const DEFAULT_MAX_POSITION_SIZE: f64 = 0.1;
pub const DEFAULT_STOP_LOSS_PCT: f64 = 0.02;
pub const DEFAULT_TAKE_PROFIT_PCT: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTrigger {
    StopLoss,
    TakeProfit,
}

impl fmt::Display for StopTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopTrigger::StopLoss => f.write_str("stop_loss"),
            StopTrigger::TakeProfit => f.write_str("take_profit"),
        }
    }
}

/// Fractions, not percentages: 0.02 is a 2% stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    pub max_position_size: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            max_position_size: DEFAULT_MAX_POSITION_SIZE,
            stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
            take_profit_pct: DEFAULT_TAKE_PROFIT_PCT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("position ratio {ratio:.2} for {symbol} exceeds max allowed {max}")]
pub struct RiskLimitExceeded {
    pub symbol: String,
    pub ratio: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RiskManager {
    pub config: RiskConfig,
    exposure: HashMap<String, f64>,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        RiskManager {
            config,
            exposure: HashMap::new(),
        }
    }

    /// Quantity affordable with `max_position_size` of `balance` at `price`.
    pub fn position_size(&self, balance: f64, price: f64) -> f64 {
        if price > 0.0 {
            balance * self.config.max_position_size / price
        } else {
            0.0
        }
    }

    pub fn stop_loss(&self, entry_price: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Long => entry_price * (1.0 - self.config.stop_loss_pct),
            Direction::Short => entry_price * (1.0 + self.config.stop_loss_pct),
        }
    }

    pub fn take_profit(&self, entry_price: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Long => entry_price * (1.0 + self.config.take_profit_pct),
            Direction::Short => entry_price * (1.0 - self.config.take_profit_pct),
        }
    }

    /// Which protective level, if any, `current_price` has reached. The stop
    /// is checked first.
    pub fn check_stop_conditions(
        &self,
        current_price: f64,
        entry_price: f64,
        direction: Direction,
    ) -> Option<StopTrigger> {
        let stop = self.stop_loss(entry_price, direction);
        let target = self.take_profit(entry_price, direction);
        let (stopped, reached) = match direction {
            Direction::Long => (current_price <= stop, current_price >= target),
            Direction::Short => (current_price >= stop, current_price <= target),
        };

        if stopped {
            Some(StopTrigger::StopLoss)
        } else if reached {
            Some(StopTrigger::TakeProfit)
        } else {
            None
        }
    }

    pub fn exposure(&self, symbol: &str) -> f64 {
        self.exposure.get(symbol).copied().unwrap_or(0.0)
    }

    /// Check that applying `signal` with `size` keeps the position value under
    /// `max_position_size` of balance plus position.
    pub fn check_risk_limits(
        &self,
        symbol: &str,
        signal: Signal,
        price: f64,
        size: f64,
        available_balance: f64,
    ) -> Result<(), RiskLimitExceeded> {
        let new_exposure = self.exposure(symbol) + signed_size(signal, size);
        let position_value = new_exposure * price;
        let denominator = available_balance + position_value;
        let ratio = if denominator > 0.0 {
            position_value / denominator
        } else {
            0.0
        };

        if ratio > self.config.max_position_size {
            return Err(RiskLimitExceeded {
                symbol: symbol.to_string(),
                ratio,
                max: self.config.max_position_size,
            });
        }
        Ok(())
    }

    pub fn update_position(&mut self, symbol: &str, signal: Signal, size: f64) {
        *self.exposure.entry(symbol.to_string()).or_insert(0.0) += signed_size(signal, size);
    }
}

fn signed_size(signal: Signal, size: f64) -> f64 {
    match signal {
        Signal::Buy => size,
        Signal::Sell => -size,
        Signal::Hold => 0.0,
    }
}
