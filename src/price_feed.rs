// Price Feed Collaborator Contract
//
// Market-data acquisition itself lives outside this core. This module only
// fixes the contract the engine consumes: any source can implement
// PriceSource, and CachedPriceFeed layers a short-TTL cache plus a table of
// default quotes on top. When the live source fails, the caller still gets a
// best-effort price together with an explicit warning; degradation is never
// silent and never fails a challenge on its own.

use crate::types::{Price, Timestamp};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anything that can produce a current price for a symbol.
pub trait PriceSource {
    fn fetch(&mut self, symbol: &str, now: Timestamp) -> Option<Price>;
}

/// Where the served price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteOrigin {
    Live,
    Cached,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedWarning {
    /// Live fetch failed; served the last cached price past its TTL.
    ServedFromCache,
    /// Never saw a price for this symbol; served the static default.
    ServedDefault,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: Price,
    pub origin: QuoteOrigin,
    pub warning: Option<FeedWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    /// How long a cached price serves without re-fetching.
    pub cache_ttl_ms: i64,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self { cache_ttl_ms: 10_000 }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PriceFeedError {
    #[error("no price available for {0}")]
    NoPriceAvailable(String),
}

/// TTL cache over a live source with static defaults as the last resort.
#[derive(Debug)]
pub struct CachedPriceFeed<S: PriceSource> {
    source: S,
    config: PriceFeedConfig,
    cache: HashMap<String, (Price, Timestamp)>,
    defaults: HashMap<String, Price>,
}

impl<S: PriceSource> CachedPriceFeed<S> {
    pub fn new(source: S, config: PriceFeedConfig) -> Self {
        Self {
            source,
            config,
            cache: HashMap::new(),
            defaults: default_quotes(),
        }
    }

    /// Serve a quote for `symbol`, freshest source first: valid cache, then a
    /// live fetch, then stale cache with a warning, then the default table.
    pub fn quote(&mut self, symbol: &str, now: Timestamp) -> Result<PriceQuote, PriceFeedError> {
        if let Some((price, at)) = self.cache.get(symbol) {
            if now.as_millis() - at.as_millis() < self.config.cache_ttl_ms {
                return Ok(PriceQuote {
                    symbol: symbol.to_string(),
                    price: *price,
                    origin: QuoteOrigin::Cached,
                    warning: None,
                });
            }
        }

        if let Some(price) = self.source.fetch(symbol, now) {
            self.cache.insert(symbol.to_string(), (price, now));
            return Ok(PriceQuote {
                symbol: symbol.to_string(),
                price,
                origin: QuoteOrigin::Live,
                warning: None,
            });
        }

        if let Some((price, _)) = self.cache.get(symbol) {
            return Ok(PriceQuote {
                symbol: symbol.to_string(),
                price: *price,
                origin: QuoteOrigin::Cached,
                warning: Some(FeedWarning::ServedFromCache),
            });
        }

        if let Some(price) = self.defaults.get(symbol) {
            return Ok(PriceQuote {
                symbol: symbol.to_string(),
                price: *price,
                origin: QuoteOrigin::Default,
                warning: Some(FeedWarning::ServedDefault),
            });
        }

        Err(PriceFeedError::NoPriceAvailable(symbol.to_string()))
    }
}

// baseline quotes for the commonly traded symbols
fn default_quotes() -> HashMap<String, Price> {
    [
        ("AAPL", dec!(190)),
        ("TSLA", dec!(220)),
        ("NVDA", dec!(500)),
        ("AMD", dec!(110)),
        ("GOOG", dec!(140)),
        ("MSFT", dec!(370)),
        ("AMZN", dec!(150)),
        ("EURUSD", dec!(1.09)),
        ("GBPUSD", dec!(1.27)),
    ]
    .into_iter()
    .map(|(s, p)| (s.to_string(), Price::new_unchecked(p)))
    .collect()
}

/// Fixed-price source for tests and simulations. Symbols can be unset to
/// exercise degradation paths.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    prices: HashMap<String, Price>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&mut self, symbol: &str, price: Price) {
        self.prices.insert(symbol.to_string(), price);
    }

    pub fn clear_price(&mut self, symbol: &str) {
        self.prices.remove(symbol);
    }
}

impl PriceSource for StaticPriceSource {
    fn fetch(&mut self, symbol: &str, _now: Timestamp) -> Option<Price> {
        self.prices.get(symbol).copied()
    }
}
