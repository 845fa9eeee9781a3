//! Monthly leaderboard ranking.
//!
//! A batch job over committed challenge state: every instance with at least
//! one trade inside the period is scored by profit percentage at period end,
//! ranked deterministically, and truncated to the top ten. Read-only; never
//! mutates challenge state.

use crate::types::{ChallengeId, Money, Timestamp};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const LEADERBOARD_SIZE: usize = 10;

/// One calendar month, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The period the given timestamp falls in.
    pub fn of(ts: Timestamp) -> Self {
        let day = ts.trading_day();
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        let day = ts.trading_day();
        day.year() == self.year && day.month() == self.month
    }

    /// True when the timestamp is on or before the period's last day.
    /// Used to compute equity "as of period end".
    pub fn includes_up_to_end(&self, ts: Timestamp) -> bool {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
            Some(next_first) => ts.trading_day() < next_first,
            None => false,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("period must be formatted YYYY-MM, got {0:?}")]
pub struct PeriodParseError(pub String);

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| PeriodParseError(s.to_string()))?;
        let year: i32 = year.parse().map_err(|_| PeriodParseError(s.to_string()))?;
        let month: u32 = month.parse().map_err(|_| PeriodParseError(s.to_string()))?;
        Period::new(year, month).ok_or_else(|| PeriodParseError(s.to_string()))
    }
}

/// Committed per-challenge snapshot the ranker consumes.
#[derive(Debug, Clone)]
pub struct RankingInput {
    pub challenge_id: ChallengeId,
    /// Raw address or handle; masked before display.
    pub user_email: String,
    pub starting_balance: Money,
    pub created_at: Timestamp,
    /// Timestamp and realized pnl (zero for opening trades) of every trade.
    pub trade_pnls: Vec<(Timestamp, Money)>,
}

/// One ranked row of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_display_name: String,
    pub profit_percent: Decimal,
    pub total_pnl: Money,
    pub trades_count: usize,
}

/// Rank all instances active in `period`. Sorted by profit percent descending;
/// ties break by total pnl descending, then earliest creation. Top ten only.
pub fn rank(inputs: &[RankingInput], period: &Period) -> Vec<LeaderboardEntry> {
    struct Scored {
        profit_percent: Decimal,
        total_pnl: Money,
        trades_count: usize,
        created_at: Timestamp,
        display_name: String,
    }

    let mut scored: Vec<Scored> = inputs
        .iter()
        .filter_map(|input| {
            let trades_count = input
                .trade_pnls
                .iter()
                .filter(|(ts, _)| period.contains(*ts))
                .count();
            if trades_count == 0 {
                return None;
            }

            let start = input.starting_balance.value();
            if start <= Decimal::ZERO {
                return None;
            }

            let pnl_to_period_end: Money = input
                .trade_pnls
                .iter()
                .filter(|(ts, _)| period.includes_up_to_end(*ts))
                .map(|(_, pnl)| pnl)
                .sum();
            let equity_at_end = input.starting_balance.add(pnl_to_period_end).round_currency();
            let total_pnl = equity_at_end.sub(input.starting_balance);
            let profit_percent = ((equity_at_end.value() - start) / start * dec!(100))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

            Some(Scored {
                profit_percent,
                total_pnl,
                trades_count,
                created_at: input.created_at,
                display_name: mask_display_name(&input.user_email),
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.profit_percent
            .cmp(&a.profit_percent)
            .then(b.total_pnl.cmp(&a.total_pnl))
            .then(a.created_at.cmp(&b.created_at))
    });
    scored.truncate(LEADERBOARD_SIZE);

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, s)| LeaderboardEntry {
            rank: idx as u32 + 1,
            user_display_name: s.display_name,
            profit_percent: s.profit_percent,
            total_pnl: s.total_pnl,
            trades_count: s.trades_count,
        })
        .collect()
}

/// Privacy mask: `bilal@example.com` becomes `bil***@example.com`.
/// Short local parts are left as-is. Counts characters, not bytes, so
/// internationalized addresses never split mid-character.
pub fn mask_display_name(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if local.chars().count() > 3 => {
            let prefix: String = local.chars().take(3).collect();
            format!("{prefix}***@{domain}")
        }
        _ => email.to_string(),
    }
}
