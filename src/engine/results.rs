// 8.0.2: result types and errors for engine operations.

use crate::challenge::{ChallengeError, ChallengeStatus};
use crate::ledger::Trade;
use crate::plan::ConfigurationError;
use crate::risk::RiskThresholds;
use crate::types::{ChallengeId, Money, PlanId, Timestamp, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only view of one challenge: the last fully committed state, with the
/// trade history newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeSummary {
    pub challenge_id: ChallengeId,
    pub user_id: UserId,
    pub plan_name: String,
    pub status: ChallengeStatus,
    pub created_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub starting_balance: Money,
    pub equity: Money,
    pub thresholds: RiskThresholds,
    pub profit_pct: Decimal,
    pub daily_loss_pct: Decimal,
    pub total_loss_pct: Decimal,
    pub trades: Vec<Trade>,
}

/// One row of the back-office challenge table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminChallengeRow {
    pub challenge_id: ChallengeId,
    pub user_id: UserId,
    pub user_email: String,
    pub plan_name: String,
    pub status: ChallengeStatus,
    pub equity: Money,
}

/// Trade-input rejection. Nothing is persisted when one of these fires.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(u64),

    #[error("Price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("Symbol must not be empty")]
    EmptySymbol,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Challenge {0:?} not found")]
    ChallengeNotFound(ChallengeId),

    #[error("Challenge {0:?} is not active")]
    ChallengeNotActive(ChallengeId),

    #[error("Plan {0:?} not found")]
    PlanNotFound(PlanId),

    #[error("User {0:?} not found")]
    UserNotFound(UserId),

    /// The challenge cell is mid-trade on another thread. Retryable.
    #[error("Challenge {0:?} is processing another trade")]
    ConcurrentContention(ChallengeId),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Challenge error: {0}")]
    Challenge(#[from] ChallengeError),
}
