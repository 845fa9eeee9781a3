// 4.0: advisory momentum classifier. compares each tick to the previous one
// for the same symbol: up = BUY, down = SELL, flat = HOLD. the first tick for
// a symbol has no predecessor and emits HOLD. display-only; nothing in the
// risk path reads these.

use crate::types::{Price, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Rolling display window, most recent entries only.
pub const SIGNAL_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// One classified tick, kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalTick {
    pub symbol: String,
    pub price: Price,
    pub timestamp: Timestamp,
    pub signal: Signal,
}

#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    last_price: HashMap<String, Price>,
    window: VecDeque<SignalTick>,
}

impl SignalGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one tick and remember it. Stateless per tick apart from the
    /// previous price per symbol.
    pub fn on_tick(&mut self, symbol: &str, price: Price, timestamp: Timestamp) -> Signal {
        let signal = match self.last_price.get(symbol) {
            None => Signal::Hold,
            Some(prev) if price > *prev => Signal::Buy,
            Some(prev) if price < *prev => Signal::Sell,
            Some(_) => Signal::Hold,
        };
        self.last_price.insert(symbol.to_string(), price);

        self.window.push_back(SignalTick {
            symbol: symbol.to_string(),
            price,
            timestamp,
            signal,
        });
        while self.window.len() > SIGNAL_WINDOW {
            self.window.pop_front();
        }

        signal
    }

    /// Most recent ticks, oldest first, at most `SIGNAL_WINDOW` entries.
    pub fn recent(&self) -> impl Iterator<Item = &SignalTick> {
        self.window.iter()
    }
}
