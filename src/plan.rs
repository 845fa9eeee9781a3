//! Challenge plan catalog and purchase-time snapshots.
//!
//! A plan is an immutable catalog entry: the price of the challenge and the
//! risk thresholds the account will be judged against. At purchase time the
//! balance and thresholds are copied into a snapshot so later catalog edits
//! never retroactively change an in-progress account.

use crate::types::{Money, PlanId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Purchasable challenge tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengePlan {
    pub id: PlanId,
    pub name: String,
    /// What the user pays for the challenge, not part of the trading balance.
    pub price: Money,
    pub starting_balance: Money,
    pub profit_target_pct: Decimal,
    pub max_daily_loss_pct: Decimal,
    pub max_total_loss_pct: Decimal,
}

impl ChallengePlan {
    pub fn new(
        id: PlanId,
        name: &str,
        price: Money,
        starting_balance: Money,
        profit_target_pct: Decimal,
        max_daily_loss_pct: Decimal,
        max_total_loss_pct: Decimal,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            price,
            starting_balance,
            profit_target_pct,
            max_daily_loss_pct,
            max_total_loss_pct,
        }
    }

    pub fn starter() -> Self {
        Self::new(
            PlanId(1),
            "Starter",
            Money::new(dec!(200)),
            Money::new(dec!(5000)),
            dec!(10),
            dec!(5),
            dec!(10),
        )
    }

    pub fn pro() -> Self {
        Self::new(
            PlanId(2),
            "Pro",
            Money::new(dec!(500)),
            Money::new(dec!(10000)),
            dec!(10),
            dec!(5),
            dec!(10),
        )
    }

    pub fn elite() -> Self {
        Self::new(
            PlanId(3),
            "Elite",
            Money::new(dec!(1000)),
            Money::new(dec!(20000)),
            dec!(10),
            dec!(5),
            dec!(10),
        )
    }
}

/// The plan fields a running challenge actually depends on, frozen at purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub starting_balance: Money,
    pub profit_target_pct: Decimal,
    pub max_daily_loss_pct: Decimal,
    pub max_total_loss_pct: Decimal,
}

impl PlanSnapshot {
    /// Validates the plan before any account can be created from it. A bad
    /// catalog entry is fatal here rather than handled per-trade.
    pub fn from_plan(plan: &ChallengePlan) -> Result<Self, ConfigurationError> {
        if plan.starting_balance.value() <= Decimal::ZERO {
            return Err(ConfigurationError::NonPositiveStartingBalance {
                value: plan.starting_balance.value(),
            });
        }
        for (name, value) in [
            ("profit_target_pct", plan.profit_target_pct),
            ("max_daily_loss_pct", plan.max_daily_loss_pct),
            ("max_total_loss_pct", plan.max_total_loss_pct),
        ] {
            if value <= Decimal::ZERO {
                return Err(ConfigurationError::NonPositiveThreshold { name, value });
            }
        }
        Ok(Self {
            starting_balance: plan.starting_balance,
            profit_target_pct: plan.profit_target_pct,
            max_daily_loss_pct: plan.max_daily_loss_pct,
            max_total_loss_pct: plan.max_total_loss_pct,
        })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigurationError {
    #[error("plan starting balance must be positive, got {value}")]
    NonPositiveStartingBalance { value: Decimal },

    #[error("plan threshold {name} must be positive, got {value}")]
    NonPositiveThreshold { name: &'static str, value: Decimal },
}
