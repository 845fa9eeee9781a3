// 2.0: append-only trade ledger with FIFO lot matching.
// a trade against an open position on the opposite side closes the oldest lots
// first and realizes pnl; any leftover flips the position. entries are never
// reordered, edited, or removed.

use crate::types::{ChallengeId, Money, Price, Quantity, Timestamp, TradeId, TradeSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// One executed trade. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub challenge_id: ChallengeId,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Quantity,
    pub price: Price,
    pub timestamp: Timestamp,
    /// Some when this trade closed existing lots; the matched pnl, rounded to cents.
    pub realized_pnl: Option<Money>,
}

/// One open lot, remembered at its entry price until closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lot {
    pub quantity: u64,
    pub price: Price,
}

/// Net open exposure for one symbol: all lots share a direction.
/// `Buy` lots are longs, `Sell` lots are shorts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: TradeSide,
    lots: VecDeque<Lot>,
}

impl OpenPosition {
    fn open(side: TradeSide, quantity: u64, price: Price) -> Self {
        let mut lots = VecDeque::new();
        lots.push_back(Lot { quantity, price });
        Self { side, lots }
    }

    pub fn quantity(&self) -> u64 {
        self.lots.iter().map(|l| l.quantity).sum()
    }

    /// Quantity-weighted average entry price across open lots.
    pub fn average_price(&self) -> Option<Price> {
        let total = self.quantity();
        if total == 0 {
            return None;
        }
        let weighted: Decimal = self
            .lots
            .iter()
            .map(|l| l.price.value() * Decimal::from(l.quantity))
            .sum();
        Price::new(weighted / Decimal::from(total))
    }

    pub fn lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }
}

/// 2.1: per-challenge trade history plus the open-lot book it implies.
/// Keeps an incrementally updated realized total; `recompute_realized_total`
/// must always agree with it exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeLedger {
    trades: Vec<Trade>,
    positions: HashMap<String, OpenPosition>,
    realized_total: Money,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated trade, matching it against the open position for its
    /// symbol. Returns the recorded trade with its realized pnl populated.
    pub fn record(
        &mut self,
        id: TradeId,
        challenge_id: ChallengeId,
        symbol: &str,
        side: TradeSide,
        quantity: Quantity,
        price: Price,
        timestamp: Timestamp,
    ) -> Trade {
        let realized_pnl = self.apply_to_position(symbol, side, quantity, price);
        if let Some(pnl) = realized_pnl {
            self.realized_total = self.realized_total.add(pnl);
        }

        let trade = Trade {
            id,
            challenge_id,
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            timestamp,
            realized_pnl,
        };
        self.trades.push(trade.clone());
        trade
    }

    // FIFO matching. Some(pnl) iff any lots were closed.
    fn apply_to_position(
        &mut self,
        symbol: &str,
        side: TradeSide,
        quantity: Quantity,
        price: Price,
    ) -> Option<Money> {
        let mut remaining = quantity.get();
        let mut remove_position = false;
        let mut realized: Option<Money> = None;

        match self.positions.get_mut(symbol) {
            Some(position) if position.side == side.opposite() => {
                let mut pnl = Money::zero();
                while remaining > 0 {
                    let Some(front) = position.lots.front_mut() else {
                        break;
                    };
                    let close_qty = front.quantity.min(remaining);
                    let per_unit = match position.side {
                        // selling into long lots
                        TradeSide::Buy => price.value() - front.price.value(),
                        // buying back short lots
                        TradeSide::Sell => front.price.value() - price.value(),
                    };
                    pnl = pnl.add(Money::new(per_unit * Decimal::from(close_qty)));
                    front.quantity -= close_qty;
                    remaining -= close_qty;
                    if front.quantity == 0 {
                        position.lots.pop_front();
                    }
                }
                realized = Some(pnl.round_currency());

                if position.lots.is_empty() {
                    if remaining > 0 {
                        // closed through zero: leftover opens on the trade side
                        position.side = side;
                        position.lots.push_back(Lot {
                            quantity: remaining,
                            price,
                        });
                    } else {
                        remove_position = true;
                    }
                }
            }
            Some(position) => {
                position.lots.push_back(Lot {
                    quantity: remaining,
                    price,
                });
            }
            None => {
                self.positions
                    .insert(symbol.to_string(), OpenPosition::open(side, remaining, price));
            }
        }

        if remove_position {
            self.positions.remove(symbol);
        }
        realized
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn open_position(&self, symbol: &str) -> Option<&OpenPosition> {
        self.positions.get(symbol)
    }

    /// Running sum of all matched pnl.
    pub fn realized_total(&self) -> Money {
        self.realized_total
    }

    /// Full O(n) recomputation from the trade history. Must equal
    /// `realized_total` exactly; used by audits and tests.
    pub fn recompute_realized_total(&self) -> Money {
        self.trades.iter().filter_map(|t| t.realized_pnl).sum()
    }
}
