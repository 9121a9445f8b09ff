#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use signalbt::domain::backtest::BacktestConfig;
use signalbt::domain::error::SignalbtError;
pub use signalbt::domain::ohlcv::Bar;
use signalbt::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        _timeframe: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SignalbtError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalbtError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| {
                        let d = b.timestamp.date();
                        d >= start_date && d <= end_date
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self, _timeframe: &str) -> Result<Vec<String>, SignalbtError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
        _timeframe: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, SignalbtError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalbtError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).and_then(|bars| {
            Some((bars.first()?.timestamp, bars.last()?.timestamp, bars.len()))
        }))
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Hourly bars from 2024-01-01 00:00 with the given closes.
pub fn hourly_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start() + Duration::hours(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 500.0,
        })
        .collect()
}

/// Daily bars from 2024-01-01 with the given closes.
pub fn daily_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start() + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// A smooth oscillation that produces both MACD and RSI crossings.
pub fn oscillating_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + (t * 0.25).sin() * 12.0 + (t * 0.07).cos() * 4.0
        })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        timeframe: "1h".to_string(),
        ..BacktestConfig::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }
}
