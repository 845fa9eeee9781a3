//! Challenge instance and its one-way status machine.
//!
//! A challenge starts `Active` and can move exactly once, to `Passed` or
//! `Failed`. Terminal states accept no trades and no further automatic
//! transitions; the instance itself is never destroyed. Every transition is
//! recorded with its trigger so automatic and manual changes stay
//! distinguishable in the audit history.

use crate::plan::PlanSnapshot;
use crate::risk::StatusCandidate;
use crate::types::{ChallengeId, Money, Timestamp, TradeId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeStatus {
    Active,
    Passed,
    Failed,
}

impl ChallengeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChallengeStatus::Passed | ChallengeStatus::Failed)
    }
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeStatus::Active => write!(f, "active"),
            ChallengeStatus::Passed => write!(f, "passed"),
            ChallengeStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What caused a status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionTrigger {
    /// Automatic, immediately after this trade settled.
    Trade(TradeId),
    /// Automatic, re-evaluation after a daily-anchor rollover.
    DailyRollover,
    /// Administrative override, separately authorized.
    Manual { actor: String },
}

impl TransitionTrigger {
    pub fn is_manual(&self) -> bool {
        matches!(self, TransitionTrigger::Manual { .. })
    }
}

/// Audit record of one status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: ChallengeStatus,
    pub to: ChallengeStatus,
    pub at: Timestamp,
    pub trigger: TransitionTrigger,
}

/// Equity recorded at the start of the current trading day. Created once per
/// UTC day, never retroactively mutated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyAnchor {
    pub day: NaiveDate,
    pub equity: Money,
}

/// One user's purchased challenge, with its frozen plan terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInstance {
    pub id: ChallengeId,
    pub user_id: UserId,
    /// Display name of the plan at purchase time, for back-office views.
    pub plan_name: String,
    pub plan: PlanSnapshot,
    pub status: ChallengeStatus,
    pub created_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub anchor: DailyAnchor,
    transitions: Vec<StatusTransition>,
}

impl ChallengeInstance {
    pub fn new(
        id: ChallengeId,
        user_id: UserId,
        plan_name: &str,
        plan: PlanSnapshot,
        created_at: Timestamp,
    ) -> Self {
        let anchor = DailyAnchor {
            day: created_at.trading_day(),
            equity: plan.starting_balance,
        };
        Self {
            id,
            user_id,
            plan_name: plan_name.to_string(),
            plan,
            status: ChallengeStatus::Active,
            created_at,
            ended_at: None,
            anchor,
            transitions: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ChallengeStatus::Active
    }

    pub fn transitions(&self) -> &[StatusTransition] {
        &self.transitions
    }

    /// Apply an automatic verdict. A no-op unless the instance is active and
    /// the candidate is terminal; returns the recorded transition if one
    /// happened.
    pub fn apply_verdict(
        &mut self,
        candidate: StatusCandidate,
        trigger: TransitionTrigger,
        at: Timestamp,
    ) -> Option<&StatusTransition> {
        debug_assert!(!trigger.is_manual(), "manual changes go through override_status");
        if !self.is_active() {
            return None;
        }
        let to = match candidate {
            StatusCandidate::Active => return None,
            StatusCandidate::Passed => ChallengeStatus::Passed,
            StatusCandidate::Failed(_) => ChallengeStatus::Failed,
        };
        self.transition_to(to, trigger, at);
        self.transitions.last()
    }

    /// Manual override. Obeys the same one-way terminal rule but is recorded
    /// as `Manual` so audits never conflate it with the evaluator.
    pub fn override_status(
        &mut self,
        to: ChallengeStatus,
        actor: &str,
        at: Timestamp,
    ) -> Result<&StatusTransition, ChallengeError> {
        if self.status.is_terminal() {
            return Err(ChallengeError::AlreadyTerminal {
                current: self.status,
            });
        }
        if !to.is_terminal() {
            return Err(ChallengeError::NonTerminalTarget);
        }
        self.transition_to(
            to,
            TransitionTrigger::Manual {
                actor: actor.to_string(),
            },
            at,
        );
        Ok(self
            .transitions
            .last()
            .unwrap_or_else(|| unreachable!("transition_to always records")))
    }

    fn transition_to(&mut self, to: ChallengeStatus, trigger: TransitionTrigger, at: Timestamp) {
        let from = self.status;
        self.status = to;
        self.ended_at = Some(at);
        self.transitions.push(StatusTransition {
            from,
            to,
            at,
            trigger,
        });
    }

    /// Roll the daily anchor to `day` with the given equity. Idempotent:
    /// rolling twice for the same calendar day changes nothing, and the
    /// anchor never moves backwards.
    pub fn roll_anchor(&mut self, day: NaiveDate, equity: Money) -> bool {
        if day <= self.anchor.day {
            return false;
        }
        self.anchor = DailyAnchor { day, equity };
        true
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ChallengeError {
    #[error("challenge already concluded as {current}")]
    AlreadyTerminal { current: ChallengeStatus },

    #[error("manual override must target passed or failed")]
    NonTerminalTarget,
}
