// 8.2 engine/trades.rs: the sole write path. one trade = validate, lock the
// cell, roll the anchor if a new UTC day started, append to the ledger,
// recompute equity, evaluate the risk rules, settle any terminal transition.
// the post-trade status is decided before this function returns.

use super::core::Engine;
use super::results::{EngineError, ValidationError};
use crate::challenge::TransitionTrigger;
use crate::equity::equity;
use crate::events::{
    AnchorRolledEvent, EventPayload, StatusChangedEvent, TradeExecutedEvent, TradeRejectedEvent,
};
use crate::ledger::Trade;
use crate::risk::{self, RiskThresholds};
use crate::types::{ChallengeId, Price, Quantity, TradeId, TradeSide};
use rust_decimal::Decimal;
use std::sync::atomic::Ordering;
use std::sync::TryLockError;

fn validate_trade_inputs(
    symbol: &str,
    quantity: u64,
    price: Decimal,
) -> Result<(Quantity, Price), ValidationError> {
    if symbol.trim().is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    let quantity = Quantity::new(quantity).ok_or(ValidationError::NonPositiveQuantity(quantity))?;
    let price = Price::new(price).ok_or(ValidationError::NonPositivePrice(price))?;
    Ok((quantity, price))
}

impl Engine {
    /// Execute one trade against a challenge. Returns the recorded trade with
    /// its realized pnl populated. A cell already mid-trade on another thread
    /// surfaces as `ConcurrentContention`; the caller may retry.
    pub fn execute_trade(
        &self,
        challenge_id: ChallengeId,
        symbol: &str,
        side: TradeSide,
        quantity: u64,
        price: Decimal,
    ) -> Result<Trade, EngineError> {
        let now = self.time();

        let (quantity, price) = match validate_trade_inputs(symbol, quantity, price) {
            Ok(validated) => validated,
            Err(e) => {
                self.emit_event(EventPayload::TradeRejected(TradeRejectedEvent {
                    challenge_id,
                    reason: e.to_string(),
                }));
                return Err(EngineError::Validation(e));
            }
        };

        let cell = self.cell(challenge_id)?;
        let mut state = match cell.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return Err(EngineError::ConcurrentContention(challenge_id))
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        if !state.instance.is_active() {
            let status = state.instance.status;
            drop(state);
            self.emit_event(EventPayload::TradeRejected(TradeRejectedEvent {
                challenge_id,
                reason: format!("challenge is {status}"),
            }));
            return Err(EngineError::ChallengeNotActive(challenge_id));
        }

        // first trade of a new UTC day rolls the anchor before it settles
        let day = now.trading_day();
        let mut anchor_rolled = None;
        if day > state.instance.anchor.day {
            let equity_before = equity(state.instance.plan.starting_balance, &state.ledger);
            if state.instance.roll_anchor(day, equity_before) {
                anchor_rolled = Some((day, equity_before));
            }
        }

        let trade_id = TradeId(self.next_trade_id.fetch_add(1, Ordering::Relaxed));
        let trade = state
            .ledger
            .record(trade_id, challenge_id, symbol, side, quantity, price, now);

        let starting_balance = state.instance.plan.starting_balance;
        let equity_after = equity(starting_balance, &state.ledger);
        let thresholds = RiskThresholds::from(&state.instance.plan);
        let report = risk::evaluate(
            equity_after,
            starting_balance,
            state.instance.anchor.equity,
            &thresholds,
        );
        let transition = state
            .instance
            .apply_verdict(report.candidate, TransitionTrigger::Trade(trade_id), now)
            .cloned();
        drop(state);

        // the cell is committed; events describe what just happened
        if let Some((day, equity)) = anchor_rolled {
            self.emit_event(EventPayload::AnchorRolled(AnchorRolledEvent {
                challenge_id,
                day,
                equity,
            }));
        }
        self.emit_event(EventPayload::TradeExecuted(TradeExecutedEvent {
            challenge_id,
            trade_id,
            symbol: trade.symbol.clone(),
            side,
            quantity,
            price,
            realized_pnl: trade.realized_pnl,
            equity_after,
        }));
        if let Some(tr) = transition {
            self.emit_event(EventPayload::StatusChanged(StatusChangedEvent {
                challenge_id,
                from: tr.from,
                to: tr.to,
                trigger: tr.trigger,
            }));
        }

        Ok(trade)
    }
}
