//! Funded Challenge Engine Simulation.
//!
//! Demonstrates the full challenge lifecycle including purchase, trade
//! execution, daily anchor rollovers, pass/fail evaluation, manual overrides,
//! and the monthly leaderboard.

use challenge_core::*;
use rust_decimal_macros::dec;

fn main() {
    println!("Funded Challenge Risk Engine Simulation");
    println!("Deterministic Evaluation, FIFO Ledger, Monthly Ranking\n");

    scenario_1_purchase_and_trading();
    scenario_2_profit_target_pass();
    scenario_3_total_loss_failure();
    scenario_4_daily_loss_failure();
    scenario_5_signals_and_price_feed();
    scenario_6_monthly_leaderboard();
    scenario_7_manual_override();

    println!("\nAll simulations completed successfully.");
}

fn engine_at(day: u32) -> Engine {
    let engine = Engine::new(EngineConfig::default());
    engine.seed_default_plans();
    engine.set_time(Timestamp::from_ymd_hms(2024, 3, day, 9, 30, 0));
    engine
}

/// Challenge purchase and ordinary trading.
fn scenario_1_purchase_and_trading() {
    println!("Scenario 1: Purchase and Basic Trading\n");

    let engine = engine_at(1);
    let alice = engine.register_user("alicia@example.com");
    let id = engine.purchase_challenge(alice, PlanId(2)).unwrap();

    println!("  Alice buys the Pro challenge: $10,000 starting balance");

    engine.execute_trade(id, "AAPL", TradeSide::Buy, 10, dec!(190)).unwrap();
    println!("  BUY 10 AAPL @ $190 (opens a long)");

    let trade = engine.execute_trade(id, "AAPL", TradeSide::Sell, 10, dec!(195)).unwrap();
    println!(
        "  SELL 10 AAPL @ $195, realized: ${}",
        trade.realized_pnl.unwrap()
    );

    let summary = engine.summary(id).unwrap();
    println!("  Status: {}, equity: ${}", summary.status, summary.equity);
    println!(
        "  Profit: {}%, daily loss: {}%, total loss: {}%\n",
        summary.profit_pct, summary.daily_loss_pct, summary.total_loss_pct
    );
}

/// Hitting the 10% profit target concludes the challenge as passed.
fn scenario_2_profit_target_pass() {
    println!("Scenario 2: Profit Target\n");

    let engine = engine_at(1);
    let bob = engine.register_user("roberto@example.com");
    let id = engine.purchase_challenge(bob, PlanId(2)).unwrap();

    engine.execute_trade(id, "NVDA", TradeSide::Buy, 20, dec!(500)).unwrap();
    println!("  BUY 20 NVDA @ $500");

    engine.execute_trade(id, "NVDA", TradeSide::Sell, 20, dec!(550)).unwrap();
    println!("  SELL 20 NVDA @ $550, +$1,000 on a $10,000 account");

    let summary = engine.summary(id).unwrap();
    println!("  Status: {}, profit: {}%", summary.status, summary.profit_pct);

    // terminal: further trades are rejected
    let rejected = engine.execute_trade(id, "NVDA", TradeSide::Buy, 1, dec!(550));
    println!("  Next trade: {}\n", rejected.unwrap_err());
}

/// Breaching the 10% total-loss limit fails the challenge immediately.
fn scenario_3_total_loss_failure() {
    println!("Scenario 3: Total Loss Breach\n");

    let engine = engine_at(1);
    let carol = engine.register_user("carolina@example.com");
    let id = engine.purchase_challenge(carol, PlanId(2)).unwrap();

    engine.execute_trade(id, "TSLA", TradeSide::Buy, 50, dec!(220)).unwrap();
    println!("  BUY 50 TSLA @ $220");

    engine.execute_trade(id, "TSLA", TradeSide::Sell, 50, dec!(198)).unwrap();
    println!("  SELL 50 TSLA @ $198, -$1,100 = 11% total loss");

    let summary = engine.summary(id).unwrap();
    println!(
        "  Status: {}, total loss: {}% (limit {}%)\n",
        summary.status, summary.total_loss_pct, summary.thresholds.max_total_loss_pct
    );
}

/// An intraday drawdown past 5% of starting balance fails the challenge even
/// when the total loss is within bounds.
fn scenario_4_daily_loss_failure() {
    println!("Scenario 4: Daily Loss Breach\n");

    let engine = engine_at(1);
    let dan = engine.register_user("danielle@example.com");
    let id = engine.purchase_challenge(dan, PlanId(2)).unwrap();

    // day 1: up $800
    engine.execute_trade(id, "AMD", TradeSide::Buy, 100, dec!(110)).unwrap();
    engine.execute_trade(id, "AMD", TradeSide::Sell, 100, dec!(118)).unwrap();
    println!("  Day 1: +$800, equity $10,800");

    // day 2: anchor rolls to 10,800, then a $600 intraday loss breaches 5%
    engine.set_time(Timestamp::from_ymd_hms(2024, 3, 2, 10, 0, 0));
    engine.roll_daily_anchor(id).unwrap();
    engine.execute_trade(id, "AMD", TradeSide::Buy, 100, dec!(118)).unwrap();
    engine.execute_trade(id, "AMD", TradeSide::Sell, 100, dec!(112)).unwrap();
    println!("  Day 2: -$600 intraday, 6% of starting balance");

    let summary = engine.summary(id).unwrap();
    println!(
        "  Status: {}, daily loss: {}%, total loss: {}%\n",
        summary.status, summary.daily_loss_pct, summary.total_loss_pct
    );
}

/// Advisory signals and the degrading price feed.
fn scenario_5_signals_and_price_feed() {
    println!("Scenario 5: Signals and Price Feed\n");

    let mut signals = SignalGenerator::new();
    for (i, price) in [dec!(190), dec!(191.5), dec!(191.5), dec!(189)].iter().enumerate() {
        let signal = signals.on_tick(
            "AAPL",
            Price::new_unchecked(*price),
            Timestamp::from_millis(i as i64 * 1000),
        );
        println!("  AAPL tick ${price}: {signal:?}");
    }

    let mut source = StaticPriceSource::new();
    source.set_price("AAPL", Price::new_unchecked(dec!(191.5)));
    let mut feed = CachedPriceFeed::new(source, Default::default());

    let quote = feed.quote("AAPL", Timestamp::from_millis(0)).unwrap();
    println!("  Live quote: AAPL ${} ({:?})", quote.price, quote.origin);

    // an unknown symbol falls back to the default table with a warning
    let quote = feed.quote("MSFT", Timestamp::from_millis(0)).unwrap();
    println!(
        "  Degraded quote: MSFT ${} ({:?}, warning {:?})\n",
        quote.price, quote.origin, quote.warning
    );
}

/// Monthly leaderboard across several challenges, including a tie.
fn scenario_6_monthly_leaderboard() {
    println!("Scenario 6: Monthly Leaderboard\n");

    let engine = engine_at(1);
    let traders = [
        ("alicia@example.com", dec!(205)),   // +$750, 7.5%
        ("roberto@example.com", dec!(209)),  // +$950, 9.5%
        ("carolina@example.com", dec!(193)), // +$150, 1.5%
    ];
    for (email, exit) in traders {
        let user = engine.register_user(email);
        let id = engine.purchase_challenge(user, PlanId(2)).unwrap();
        engine.execute_trade(id, "AAPL", TradeSide::Buy, 50, dec!(190)).unwrap();
        engine.execute_trade(id, "AAPL", TradeSide::Sell, 50, exit).unwrap();
        engine.advance_time(60_000);
    }

    let board = engine.leaderboard(&Period::new(2024, 3).unwrap());
    for entry in &board {
        println!(
            "  #{} {:<24} {:>7}%  pnl ${:>9}  ({} trades)",
            entry.rank, entry.user_display_name, entry.profit_percent, entry.total_pnl, entry.trades_count
        );
    }
    println!();
}

/// Manual override from the back office, audited separately from the evaluator.
fn scenario_7_manual_override() {
    println!("Scenario 7: Manual Override\n");

    let engine = engine_at(1);
    let eve = engine.register_user("evelyn@example.com");
    let id = engine.purchase_challenge(eve, PlanId(1)).unwrap();

    engine.admin_set_status(id, ChallengeStatus::Failed, "ops@desk").unwrap();
    println!("  ops@desk manually fails challenge {:?}", id);

    let summary = engine.summary(id).unwrap();
    println!("  Status: {}", summary.status);

    // one-way: a second override is refused
    let refused = engine.admin_set_status(id, ChallengeStatus::Passed, "ops@desk");
    println!("  Second override: {}", refused.unwrap_err());

    for row in engine.admin_challenges() {
        println!(
            "  Admin table: #{} {} {} equity ${} ({})",
            row.challenge_id.0, row.user_email, row.plan_name, row.equity, row.status
        );
    }
}
