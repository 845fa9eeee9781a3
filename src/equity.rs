// 3.0: equity derivation. equity = starting balance + all realized pnl.
// open lots are never marked to market; a trade only moves equity once it
// closes lots and realizes pnl.

use crate::ledger::TradeLedger;
use crate::types::Money;

/// Current account equity, rounded to cents. Pure, no side effects.
pub fn equity(starting_balance: Money, ledger: &TradeLedger) -> Money {
    starting_balance.add(ledger.realized_total()).round_currency()
}

/// O(n) recomputation over the full history. Must equal `equity` exactly;
/// audits use this to cross-check the ledger's running total.
pub fn recomputed_equity(starting_balance: Money, ledger: &TradeLedger) -> Money {
    starting_balance
        .add(ledger.recompute_realized_total())
        .round_currency()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChallengeId, Price, Quantity, Timestamp, TradeId, TradeSide};
    use rust_decimal_macros::dec;

    #[test]
    fn equity_is_starting_balance_when_ledger_empty() {
        let ledger = TradeLedger::new();
        let eq = equity(Money::new(dec!(10000)), &ledger);
        assert_eq!(eq.value(), dec!(10000));
    }

    #[test]
    fn equity_moves_only_on_realized_pnl() {
        let mut ledger = TradeLedger::new();
        let start = Money::new(dec!(10000));

        ledger.record(
            TradeId(1),
            ChallengeId(1),
            "AAPL",
            TradeSide::Buy,
            Quantity::new(10).unwrap(),
            Price::new_unchecked(dec!(100)),
            Timestamp::from_millis(0),
        );
        // open lot: no mark-to-market, equity unchanged
        assert_eq!(equity(start, &ledger).value(), dec!(10000));

        ledger.record(
            TradeId(2),
            ChallengeId(1),
            "AAPL",
            TradeSide::Sell,
            Quantity::new(10).unwrap(),
            Price::new_unchecked(dec!(110)),
            Timestamp::from_millis(1000),
        );
        assert_eq!(equity(start, &ledger).value(), dec!(10100));
    }

    #[test]
    fn incremental_and_recomputed_agree() {
        let mut ledger = TradeLedger::new();
        let start = Money::new(dec!(5000));

        for (id, side, qty, price) in [
            (1u64, TradeSide::Buy, 7u64, dec!(33.33)),
            (2, TradeSide::Sell, 3, dec!(35.01)),
            (3, TradeSide::Sell, 4, dec!(31.99)),
            (4, TradeSide::Sell, 2, dec!(30.50)),
            (5, TradeSide::Buy, 2, dec!(29.75)),
        ] {
            ledger.record(
                TradeId(id),
                ChallengeId(1),
                "AMD",
                side,
                Quantity::new(qty).unwrap(),
                Price::new_unchecked(price),
                Timestamp::from_millis(id as i64),
            );
        }

        assert_eq!(equity(start, &ledger), recomputed_equity(start, &ledger));
    }
}
