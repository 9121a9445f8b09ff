//! Report generation port.

use std::collections::BTreeMap;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::SignalbtError;

/// Port for rendering a batch of backtest results.
pub trait ReportPort {
    fn render(
        &self,
        results: &BTreeMap<String, BacktestResult>,
        config: &BacktestConfig,
    ) -> String;

    /// Default implementation: writes the rendered text to `output_path`.
    fn write(
        &self,
        results: &BTreeMap<String, BacktestResult>,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), SignalbtError> {
        std::fs::write(output_path, self.render(results, config))?;
        Ok(())
    }
}
