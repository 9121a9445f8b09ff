//! Domain error types.

/// Top-level error type for signalbt.
#[derive(Debug, thiserror::Error)]
pub enum SignalbtError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("misaligned series for {symbol}: {reason}")]
    MisalignedSeries { symbol: String, reason: String },

    #[error("no backtest results to summarize")]
    EmptyResultSet,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalbtError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SignalbtError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl SignalbtError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            SignalbtError::Io(_) => 1,
            SignalbtError::ConfigParse { .. }
            | SignalbtError::ConfigMissing { .. }
            | SignalbtError::ConfigInvalid { .. } => 2,
            SignalbtError::DataSource { .. } => 3,
            SignalbtError::NoData { .. }
            | SignalbtError::InsufficientData { .. }
            | SignalbtError::MisalignedSeries { .. } => 5,
            SignalbtError::EmptyResultSet => 6,
        }
    }
}

impl From<&SignalbtError> for std::process::ExitCode {
    fn from(err: &SignalbtError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
