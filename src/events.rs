// 5.0: every state change produces an event. used for audit trails and for
// notifying external systems. the EventPayload enum lists all event types.

use crate::challenge::{ChallengeStatus, TransitionTrigger};
use crate::types::{ChallengeId, EventId, Money, Price, Quantity, Timestamp, TradeId, TradeSide, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    ChallengeCreated(ChallengeCreatedEvent),
    TradeExecuted(TradeExecutedEvent),
    TradeRejected(TradeRejectedEvent),
    StatusChanged(StatusChangedEvent),
    AnchorRolled(AnchorRolledEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeCreatedEvent {
    pub challenge_id: ChallengeId,
    pub user_id: UserId,
    pub plan_name: String,
    pub starting_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExecutedEvent {
    pub challenge_id: ChallengeId,
    pub trade_id: TradeId,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Quantity,
    pub price: Price,
    pub realized_pnl: Option<Money>,
    pub equity_after: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRejectedEvent {
    pub challenge_id: ChallengeId,
    pub reason: String,
}

/// Carries the full trigger, so automatic (trade, rollover) and manual
/// transitions stay distinguishable in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    pub challenge_id: ChallengeId,
    pub from: ChallengeStatus,
    pub to: ChallengeStatus,
    pub trigger: TransitionTrigger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorRolledEvent {
    pub challenge_id: ChallengeId,
    pub day: NaiveDate,
    pub equity: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_change_event_preserves_trigger() {
        let event = Event::new(
            EventId(1),
            Timestamp::from_millis(1000),
            EventPayload::StatusChanged(StatusChangedEvent {
                challenge_id: ChallengeId(9),
                from: ChallengeStatus::Active,
                to: ChallengeStatus::Failed,
                trigger: TransitionTrigger::Manual {
                    actor: "ops".to_string(),
                },
            }),
        );

        match event.payload {
            EventPayload::StatusChanged(e) => assert!(e.trigger.is_manual()),
            _ => panic!("wrong payload"),
        }
    }

    #[test]
    fn events_serialize() {
        let event = Event::new(
            EventId(2),
            Timestamp::from_millis(0),
            EventPayload::TradeExecuted(TradeExecutedEvent {
                challenge_id: ChallengeId(1),
                trade_id: TradeId(1),
                symbol: "AAPL".to_string(),
                side: TradeSide::Buy,
                quantity: Quantity::new(1).unwrap(),
                price: Price::new_unchecked(dec!(190)),
                realized_pnl: None,
                equity_after: Money::new(dec!(10000)),
            }),
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("TradeExecuted"));
    }
}
