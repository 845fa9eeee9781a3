// 8.3 engine/evaluation.rs: scheduled anchor rollovers and manual overrides.
// both share the trade path's cell locking but neither appends to the ledger.

use super::core::Engine;
use super::results::EngineError;
use crate::challenge::{ChallengeStatus, TransitionTrigger};
use crate::equity::equity;
use crate::events::{AnchorRolledEvent, EventPayload, StatusChangedEvent};
use crate::risk::{self, RiskThresholds};
use crate::types::ChallengeId;
use std::sync::TryLockError;

impl Engine {
    /// Roll the daily anchor to the current trading day. Scheduled once per
    /// UTC midnight; safe to call repeatedly. Returns whether the anchor
    /// moved. Terminal challenges are left alone.
    pub fn roll_daily_anchor(&self, challenge_id: ChallengeId) -> Result<bool, EngineError> {
        let now = self.time();
        let cell = self.cell(challenge_id)?;
        let mut state = match cell.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return Err(EngineError::ConcurrentContention(challenge_id))
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        if !state.instance.is_active() {
            return Ok(false);
        }

        let starting_balance = state.instance.plan.starting_balance;
        let current_equity = equity(starting_balance, &state.ledger);
        let rolled = state.instance.roll_anchor(now.trading_day(), current_equity);

        // re-evaluate against the fresh anchor; the rollover itself can
        // conclude a challenge that sat exactly on a limit
        let thresholds = RiskThresholds::from(&state.instance.plan);
        let report = risk::evaluate(
            current_equity,
            starting_balance,
            state.instance.anchor.equity,
            &thresholds,
        );
        let transition = state
            .instance
            .apply_verdict(report.candidate, TransitionTrigger::DailyRollover, now)
            .cloned();
        drop(state);

        if rolled {
            self.emit_event(EventPayload::AnchorRolled(AnchorRolledEvent {
                challenge_id,
                day: now.trading_day(),
                equity: current_equity,
            }));
        }
        if let Some(tr) = transition {
            self.emit_event(EventPayload::StatusChanged(StatusChangedEvent {
                challenge_id,
                from: tr.from,
                to: tr.to,
                trigger: tr.trigger,
            }));
        }
        Ok(rolled)
    }

    /// Manual status override, bypassing the evaluator. Obeys the one-way
    /// terminal rule and is recorded with the acting operator.
    pub fn admin_set_status(
        &self,
        challenge_id: ChallengeId,
        to: ChallengeStatus,
        actor: &str,
    ) -> Result<(), EngineError> {
        let now = self.time();
        let cell = self.cell(challenge_id)?;
        let mut state = match cell.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return Err(EngineError::ConcurrentContention(challenge_id))
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let tr = state.instance.override_status(to, actor, now)?.clone();
        drop(state);

        self.emit_event(EventPayload::StatusChanged(StatusChangedEvent {
            challenge_id,
            from: tr.from,
            to: tr.to,
            trigger: tr.trigger,
        }));
        Ok(())
    }
}
