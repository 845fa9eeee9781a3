//! Risk rule evaluation.
//!
//! Turns an equity figure into the three risk percentages and a status
//! candidate. Breach checks run before the success check, and the total-loss
//! rule outranks the daily-loss rule. This function is pure and idempotent;
//! terminality is the state machine's job, not this one's.

use crate::plan::PlanSnapshot;
use crate::types::{percent_of, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The thresholds a challenge is judged against, in percent of starting balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub profit_target_pct: Decimal,
    pub max_daily_loss_pct: Decimal,
    pub max_total_loss_pct: Decimal,
}

impl From<&PlanSnapshot> for RiskThresholds {
    fn from(snapshot: &PlanSnapshot) -> Self {
        Self {
            profit_target_pct: snapshot.profit_target_pct,
            max_daily_loss_pct: snapshot.max_daily_loss_pct,
            max_total_loss_pct: snapshot.max_total_loss_pct,
        }
    }
}

/// Which limit was breached on a failure verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreachKind {
    TotalLoss,
    DailyLoss,
}

/// What the rules say the status should be. `Active` means no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCandidate {
    Active,
    Passed,
    Failed(BreachKind),
}

/// Full evaluation output: candidate plus the three percentages, all derived
/// from the same inputs so callers never recompute them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    pub candidate: StatusCandidate,
    pub profit_pct: Decimal,
    pub daily_loss_pct: Decimal,
    pub total_loss_pct: Decimal,
}

/// Evaluate the risk rules for one challenge.
///
/// Loss percentages are clamped at zero, so a profitable account always shows
/// zero loss. The starting balance is guaranteed positive upstream by plan
/// snapshot validation.
pub fn evaluate(
    equity: Money,
    starting_balance: Money,
    daily_anchor_equity: Money,
    thresholds: &RiskThresholds,
) -> RiskReport {
    debug_assert!(starting_balance.value() > Decimal::ZERO);

    let start = starting_balance.value();
    let eq = equity.value();
    let anchor = daily_anchor_equity.value();

    let profit_pct = percent_of(eq - start, start);
    let total_loss_pct = percent_of(start - eq, start).max(Decimal::ZERO);
    let daily_loss_pct = percent_of(anchor - eq, start).max(Decimal::ZERO);

    let candidate = if total_loss_pct >= thresholds.max_total_loss_pct {
        StatusCandidate::Failed(BreachKind::TotalLoss)
    } else if daily_loss_pct >= thresholds.max_daily_loss_pct {
        StatusCandidate::Failed(BreachKind::DailyLoss)
    } else if profit_pct >= thresholds.profit_target_pct {
        StatusCandidate::Passed
    } else {
        StatusCandidate::Active
    };

    RiskReport {
        candidate,
        profit_pct,
        daily_loss_pct,
        total_loss_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn thresholds() -> RiskThresholds {
        RiskThresholds {
            profit_target_pct: dec!(10),
            max_daily_loss_pct: dec!(5),
            max_total_loss_pct: dec!(10),
        }
    }

    fn eval(equity: Decimal, anchor: Decimal) -> RiskReport {
        evaluate(
            Money::new(equity),
            Money::new(dec!(10000)),
            Money::new(anchor),
            &thresholds(),
        )
    }

    #[test]
    fn flat_account_stays_active() {
        let report = eval(dec!(10000), dec!(10000));
        assert_eq!(report.candidate, StatusCandidate::Active);
        assert_eq!(report.profit_pct, dec!(0));
        assert_eq!(report.daily_loss_pct, dec!(0));
        assert_eq!(report.total_loss_pct, dec!(0));
    }

    #[test]
    fn profit_target_passes() {
        // equity 11000 on 10000: exactly the 10% target
        let report = eval(dec!(11000), dec!(10000));
        assert_eq!(report.candidate, StatusCandidate::Passed);
        assert_eq!(report.profit_pct, dec!(10));
    }

    #[test]
    fn total_loss_breach_fails() {
        // equity 8900: 11% total loss against a 10% cap
        let report = eval(dec!(8900), dec!(10000));
        assert_eq!(
            report.candidate,
            StatusCandidate::Failed(BreachKind::TotalLoss)
        );
        assert_eq!(report.total_loss_pct, dec!(11));
    }

    #[test]
    fn daily_breach_fires_before_profit_check() {
        // 6% intraday drawdown breaches the 5% daily cap even though the
        // 6% total loss alone would not fail the account
        let report = eval(dec!(9400), dec!(10000));
        assert_eq!(
            report.candidate,
            StatusCandidate::Failed(BreachKind::DailyLoss)
        );
        assert_eq!(report.daily_loss_pct, dec!(6));
        assert_eq!(report.total_loss_pct, dec!(6));
    }

    #[test]
    fn total_breach_outranks_daily_breach() {
        // both limits breached: total-loss reason wins
        let report = eval(dec!(8500), dec!(10000));
        assert_eq!(
            report.candidate,
            StatusCandidate::Failed(BreachKind::TotalLoss)
        );
    }

    #[test]
    fn losses_clamp_at_zero_in_profit() {
        let report = eval(dec!(10500), dec!(10200));
        assert_eq!(report.total_loss_pct, dec!(0));
        assert_eq!(report.daily_loss_pct, dec!(0));
        assert_eq!(report.profit_pct, dec!(5));
    }

    #[test]
    fn intraday_loss_uses_anchor_not_start() {
        // anchor above start: a drop back to start is a daily loss but no total loss
        let report = eval(dec!(10000), dec!(10600));
        assert_eq!(report.daily_loss_pct, dec!(6));
        assert_eq!(report.total_loss_pct, dec!(0));
        assert_eq!(
            report.candidate,
            StatusCandidate::Failed(BreachKind::DailyLoss)
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let a = eval(dec!(9731.44), dec!(9980.12));
        let b = eval(dec!(9731.44), dec!(9980.12));
        assert_eq!(a, b);
    }
}
