//! CSV bar cache adapter.
//!
//! One file per symbol and timeframe, `{symbol}_{timeframe}_historical.csv`,
//! with a `timestamp,open,high,low,close,volume` header. Extra columns are
//! ignored on read.

use crate::domain::error::SignalbtError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_SUFFIX: &str = "historical.csv";

#[derive(Debug, Serialize, Deserialize)]
struct BarRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl BarRow {
    fn from_bar(bar: &Bar) -> Self {
        BarRow {
            timestamp: bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    fn into_bar(self) -> Result<Bar, SignalbtError> {
        Ok(Bar {
            timestamp: parse_timestamp(&self.timestamp)?,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, the ISO `T` separator, or a bare date at
/// midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, SignalbtError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| SignalbtError::DataSource {
            reason: format!("invalid timestamp '{value}': {e}"),
        })
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path
            .join(format!("{symbol}_{timeframe}_{FILE_SUFFIX}"))
    }

    /// Every bar in the file, sorted ascending with duplicate timestamps
    /// dropped.
    fn read_all(&self, symbol: &str, timeframe: &str) -> Result<Vec<Bar>, SignalbtError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| SignalbtError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for row in rdr.deserialize::<BarRow>() {
            let row = row.map_err(|e| SignalbtError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            bars.push(row.into_bar()?);
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Ok(bars)
    }

    /// Write `bars` to the cache file for `symbol`/`timeframe`, replacing any
    /// existing file.
    pub fn store_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        bars: &[Bar],
    ) -> Result<PathBuf, SignalbtError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.csv_path(symbol, timeframe);

        let mut wtr = csv::Writer::from_path(&path).map_err(|e| SignalbtError::DataSource {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;
        for bar in bars {
            wtr.serialize(BarRow::from_bar(bar))
                .map_err(|e| SignalbtError::DataSource {
                    reason: format!("CSV write error: {}", e),
                })?;
        }
        wtr.flush()?;
        Ok(path)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SignalbtError> {
        let mut bars = self.read_all(symbol, timeframe)?;
        bars.retain(|b| {
            let date = b.timestamp.date();
            date >= start_date && date <= end_date
        });
        Ok(bars)
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, SignalbtError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SignalbtError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{timeframe}_{FILE_SUFFIX}");
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| SignalbtError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, SignalbtError> {
        if !self.csv_path(symbol, timeframe).exists() {
            return Ok(None);
        }
        let bars = self.read_all(symbol, timeframe)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, bars.len())),
            _ => None,
        })
    }
}
