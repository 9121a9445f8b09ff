//! Majority-vote composition of sub-strategies.
//!
//! Every bar, each sub-strategy casts one vote. The signal with the most votes
//! wins; ties resolve Buy over Sell over Hold, so a tied vote always leans
//! towards entering.

use super::Strategy;
use crate::domain::backtest::MIN_BARS;
use crate::domain::ohlcv::Bar;
use crate::domain::signal::Signal;

#[derive(Debug, Default)]
pub struct CombinedStrategy {
    strategies: Vec<Box<dyn Strategy>>,
}

impl CombinedStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        CombinedStrategy { strategies }
    }

    /// Append a sub-strategy. Order is kept but does not affect the vote.
    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Vote counts for a single bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl VoteTally {
    pub fn record(&mut self, signal: Signal) {
        match signal {
            Signal::Buy => self.buy += 1,
            Signal::Sell => self.sell += 1,
            Signal::Hold => self.hold += 1,
        }
    }

    pub fn winner(&self) -> Signal {
        let max = self.buy.max(self.sell).max(self.hold);
        if self.buy == max {
            Signal::Buy
        } else if self.sell == max {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl FromIterator<Signal> for VoteTally {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        let mut tally = VoteTally::default();
        for signal in iter {
            tally.record(signal);
        }
        tally
    }
}

impl Strategy for CombinedStrategy {
    fn name(&self) -> String {
        let members: Vec<String> = self.strategies.iter().map(|s| s.name()).collect();
        format!("Combined[{}]", members.join(", "))
    }

    fn min_bars(&self) -> usize {
        self.strategies
            .iter()
            .map(|s| s.min_bars())
            .max()
            .unwrap_or(MIN_BARS)
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        if self.strategies.is_empty() {
            return vec![Signal::Hold; bars.len()];
        }

        let member_signals: Vec<Vec<Signal>> = self
            .strategies
            .iter()
            .map(|s| s.generate_signals(bars))
            .collect();

        (0..bars.len())
            .map(|i| {
                member_signals
                    .iter()
                    .map(|signals| signals.get(i).copied().unwrap_or_default())
                    .collect::<VoteTally>()
                    .winner()
            })
            .collect()
    }
}
