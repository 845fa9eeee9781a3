//! Property-based tests for the risk math and the ledger.
//!
//! These tests verify invariants hold under random inputs.

use challenge_core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Strategies for generating test data
fn equity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000i64).prop_map(|x| Decimal::new(x, 2)) // $0.01 to $50,000
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_00i64).prop_map(|x| Decimal::new(x, 2)) // $0.01 to $100,000
}

fn quantity_strategy() -> impl Strategy<Value = u64> {
    1u64..1_000u64
}

fn thresholds() -> RiskThresholds {
    RiskThresholds {
        profit_target_pct: dec!(10),
        max_daily_loss_pct: dec!(5),
        max_total_loss_pct: dec!(10),
    }
}

proptest! {
    /// Evaluation is a pure function: same inputs, same report.
    #[test]
    fn evaluation_is_deterministic(
        equity in equity_strategy(),
        anchor in equity_strategy(),
    ) {
        let start = Money::new(dec!(10000));
        let a = evaluate(Money::new(equity), start, Money::new(anchor), &thresholds());
        let b = evaluate(Money::new(equity), start, Money::new(anchor), &thresholds());
        prop_assert_eq!(a, b);
    }

    /// Loss percentages never go negative.
    #[test]
    fn loss_percentages_are_clamped(
        equity in equity_strategy(),
        anchor in equity_strategy(),
    ) {
        let report = evaluate(
            Money::new(equity),
            Money::new(dec!(10000)),
            Money::new(anchor),
            &thresholds(),
        );
        prop_assert!(report.total_loss_pct >= Decimal::ZERO);
        prop_assert!(report.daily_loss_pct >= Decimal::ZERO);
    }

    /// No total loss is reported while equity is at or above the start.
    #[test]
    fn no_total_loss_at_or_above_start(
        gain in 0i64..1_000_000i64,
        anchor in equity_strategy(),
    ) {
        let start = dec!(10000);
        let equity = start + Decimal::new(gain, 2);
        let report = evaluate(
            Money::new(equity),
            Money::new(start),
            Money::new(anchor),
            &thresholds(),
        );
        prop_assert_eq!(report.total_loss_pct, Decimal::ZERO);
        prop_assert!(!matches!(report.candidate, StatusCandidate::Failed(BreachKind::TotalLoss)));
    }

    /// A failed verdict always names the breached limit, and total-loss
    /// outranks daily-loss when both are breached.
    #[test]
    fn breach_ordering_holds(
        equity in equity_strategy(),
        anchor in equity_strategy(),
    ) {
        let t = thresholds();
        let report = evaluate(
            Money::new(equity),
            Money::new(dec!(10000)),
            Money::new(anchor),
            &t,
        );
        if report.total_loss_pct >= t.max_total_loss_pct {
            prop_assert_eq!(report.candidate, StatusCandidate::Failed(BreachKind::TotalLoss));
        } else if report.daily_loss_pct >= t.max_daily_loss_pct {
            prop_assert_eq!(report.candidate, StatusCandidate::Failed(BreachKind::DailyLoss));
        }
    }

    /// Opening and fully closing a position realizes exactly
    /// quantity * (exit - entry) for a long, and the ledger's incremental
    /// total agrees with a full recomputation.
    #[test]
    fn round_trip_conserves_pnl(
        quantity in quantity_strategy(),
        entry in price_strategy(),
        exit in price_strategy(),
    ) {
        let mut ledger = TradeLedger::new();
        let qty = Quantity::new(quantity).unwrap();
        ledger.record(
            TradeId(1),
            ChallengeId(1),
            "AAPL",
            TradeSide::Buy,
            qty,
            Price::new_unchecked(entry),
            Timestamp::from_millis(0),
        );
        let close = ledger.record(
            TradeId(2),
            ChallengeId(1),
            "AAPL",
            TradeSide::Sell,
            qty,
            Price::new_unchecked(exit),
            Timestamp::from_millis(1),
        );

        let expected = ((exit - entry) * Decimal::from(quantity))
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        prop_assert_eq!(close.realized_pnl.unwrap().value(), expected);
        prop_assert_eq!(ledger.realized_total(), ledger.recompute_realized_total());
    }

    /// Partial closes realize the same total as one full close.
    #[test]
    fn partial_closes_sum_to_full_close(
        first in 1u64..500u64,
        second in 1u64..500u64,
        entry in price_strategy(),
        exit in price_strategy(),
    ) {
        let total = first + second;

        let mut split = TradeLedger::new();
        split.record(
            TradeId(1), ChallengeId(1), "AAPL", TradeSide::Buy,
            Quantity::new(total).unwrap(), Price::new_unchecked(entry),
            Timestamp::from_millis(0),
        );
        split.record(
            TradeId(2), ChallengeId(1), "AAPL", TradeSide::Sell,
            Quantity::new(first).unwrap(), Price::new_unchecked(exit),
            Timestamp::from_millis(1),
        );
        split.record(
            TradeId(3), ChallengeId(1), "AAPL", TradeSide::Sell,
            Quantity::new(second).unwrap(), Price::new_unchecked(exit),
            Timestamp::from_millis(2),
        );

        let mut whole = TradeLedger::new();
        whole.record(
            TradeId(1), ChallengeId(1), "AAPL", TradeSide::Buy,
            Quantity::new(total).unwrap(), Price::new_unchecked(entry),
            Timestamp::from_millis(0),
        );
        whole.record(
            TradeId(2), ChallengeId(1), "AAPL", TradeSide::Sell,
            Quantity::new(total).unwrap(), Price::new_unchecked(exit),
            Timestamp::from_millis(1),
        );

        // per-trade rounding can differ by at most a cent between the shapes
        let diff = (split.realized_total().value() - whole.realized_total().value()).abs();
        prop_assert!(diff <= dec!(0.01));
    }

    /// Invalid trade inputs are rejected and persist nothing.
    #[test]
    fn invalid_inputs_persist_nothing(
        bad_price in -1_000_00i64..=0i64,
        quantity in quantity_strategy(),
    ) {
        let engine = Engine::new(EngineConfig::default());
        engine.seed_default_plans();
        let user = engine.register_user("trader@example.com");
        let id = engine.purchase_challenge(user, PlanId(2)).unwrap();

        let result = engine.execute_trade(
            id, "AAPL", TradeSide::Buy, quantity, Decimal::new(bad_price, 2),
        );
        prop_assert!(matches!(result, Err(EngineError::Validation(_))));

        let result = engine.execute_trade(id, "AAPL", TradeSide::Buy, 0, dec!(190));
        prop_assert!(matches!(result, Err(EngineError::Validation(_))));

        let summary = engine.summary(id).unwrap();
        prop_assert!(summary.trades.is_empty());
        prop_assert_eq!(summary.equity.value(), dec!(10000));
    }

    /// A terminal challenge rejects every subsequent trade, whatever it is.
    #[test]
    fn terminal_challenges_reject_all_trades(
        quantity in quantity_strategy(),
        price in price_strategy(),
    ) {
        let engine = Engine::new(EngineConfig::default());
        engine.seed_default_plans();
        let user = engine.register_user("trader@example.com");
        let id = engine.purchase_challenge(user, PlanId(2)).unwrap();
        engine.admin_set_status(id, ChallengeStatus::Failed, "ops").unwrap();

        let result = engine.execute_trade(id, "AAPL", TradeSide::Buy, quantity, price);
        prop_assert!(matches!(result, Err(EngineError::ChallengeNotActive(_))));
        prop_assert!(engine.summary(id).unwrap().trades.is_empty());
    }
}
