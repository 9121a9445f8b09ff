//! Core domain types and logic.

pub mod account;
pub mod backtest;
pub mod batch;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod report;
pub mod risk;
pub mod signal;
pub mod strategy;
