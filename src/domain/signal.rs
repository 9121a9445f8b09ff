//! Per-bar trade signal.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal: {0:?}")]
pub struct UnknownSignal(pub String);

impl FromStr for Signal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Signal::Buy),
            "sell" => Ok(Signal::Sell),
            "hold" => Ok(Signal::Hold),
            _ => Err(UnknownSignal(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Signal::Buy.to_string(), "buy");
        assert_eq!(Signal::Sell.to_string(), "sell");
        assert_eq!(Signal::Hold.to_string(), "hold");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("BUY".parse::<Signal>().unwrap(), Signal::Buy);
        assert_eq!(" sell ".parse::<Signal>().unwrap(), Signal::Sell);
        assert_eq!("Hold".parse::<Signal>().unwrap(), Signal::Hold);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "short".parse::<Signal>().unwrap_err();
        assert_eq!(err, UnknownSignal("short".into()));
    }

    #[test]
    fn default_is_hold() {
        assert_eq!(Signal::default(), Signal::Hold);
    }
}
