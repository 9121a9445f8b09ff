//! INI file configuration adapter.
//!
//! Values can optionally be overridden from the environment: with prefix
//! `SIGNALBT`, `[backtest] symbols` is read from `SIGNALBT_BACKTEST_SYMBOLS`
//! when that variable is set.

use crate::domain::error::SignalbtError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub const ENV_PREFIX: &str = "SIGNALBT";

pub struct FileConfigAdapter {
    config: Ini,
    env_prefix: Option<String>,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SignalbtError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| SignalbtError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self {
            config,
            env_prefix: None,
        })
    }

    pub fn from_string(content: &str) -> Result<Self, SignalbtError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| SignalbtError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            env_prefix: None,
        })
    }

    /// Let `{prefix}_{SECTION}_{KEY}` environment variables take precedence
    /// over file values.
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    fn env_key(prefix: &str, section: &str, key: &str) -> String {
        format!("{prefix}_{section}_{key}")
            .to_uppercase()
            .replace(['-', '.'], "_")
    }

    fn raw(&self, section: &str, key: &str) -> Option<String> {
        if let Some(prefix) = &self.env_prefix {
            if let Ok(value) = std::env::var(Self::env_key(prefix, section, key)) {
                return Some(value);
            }
        }
        self.config.get(section, key)
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.raw(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.raw(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.raw(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.raw(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}
