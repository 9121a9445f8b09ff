//! Market data access port.

use crate::domain::error::SignalbtError;
use crate::domain::ohlcv::Bar;
use chrono::{NaiveDate, NaiveDateTime};

pub trait DataPort {
    /// Bars for `symbol` at `timeframe` whose date falls within
    /// `[start_date, end_date]`, sorted ascending by timestamp.
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SignalbtError>;

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, SignalbtError>;

    /// First timestamp, last timestamp and bar count, or `None` if the
    /// symbol has no stored bars.
    fn get_data_range(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, SignalbtError>;
}
