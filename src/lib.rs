// challenge-core: funded-challenge risk evaluation and ranking engine.
// rules-first architecture: breach checks outrank everything else.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: ChallengeId, TradeSide, Price, Money, Timestamp
//   2.x  ledger.rs: append-only trade ledger, FIFO lot matching
//   3.x  plan.rs: challenge plan catalog + purchase-time snapshots
//   3.1  equity.rs: realized-only equity calculation
//   4.x  signal.rs: advisory BUY/SELL/HOLD momentum classifier
//   5.x  events.rs: state transition events for audit
//   6.x  risk.rs: profit/daily-loss/total-loss evaluation, breach ordering
//   6.1  challenge.rs: instance + one-way status machine, daily anchor
//   7.x  leaderboard.rs: monthly ranking, tie-breaks, display masking
//   8.x  engine/: orchestration: trades, rollovers, overrides, queries
//   9.x  price_feed.rs: price source contract + TTL cache (mocked)

// core challenge modules
pub mod challenge;
pub mod engine;
pub mod equity;
pub mod events;
pub mod ledger;
pub mod plan;
pub mod risk;
pub mod types;

// ranking and display modules
pub mod leaderboard;
pub mod signal;

// integration modules
pub mod price_feed;

// re exports for convenience
pub use challenge::*;
pub use engine::*;
pub use equity::*;
pub use events::*;
pub use ledger::*;
pub use plan::*;
pub use risk::*;
pub use types::*;
pub use leaderboard::{rank, LeaderboardEntry, Period, RankingInput, LEADERBOARD_SIZE};
pub use signal::{Signal, SignalGenerator, SignalTick, SIGNAL_WINDOW};
pub use price_feed::{CachedPriceFeed, FeedWarning, PriceQuote, PriceSource, StaticPriceSource};
