// 8.4 engine/queries.rs: read-only views over committed cells. these take the
// blocking lock (a query can wait out an in-flight trade) and never mutate
// challenge state.

use super::core::Engine;
use super::results::{AdminChallengeRow, ChallengeSummary, EngineError};
use crate::equity::equity;
use crate::leaderboard::{rank, LeaderboardEntry, Period, RankingInput};
use crate::risk::{self, RiskThresholds};
use crate::types::{ChallengeId, Money, UserId};

impl Engine {
    /// Snapshot of one challenge after its last committed trade.
    pub fn summary(&self, challenge_id: ChallengeId) -> Result<ChallengeSummary, EngineError> {
        let cell = self.cell(challenge_id)?;
        let state = cell.lock().unwrap_or_else(|e| e.into_inner());

        let starting_balance = state.instance.plan.starting_balance;
        let current_equity = equity(starting_balance, &state.ledger);
        let thresholds = RiskThresholds::from(&state.instance.plan);
        let report = risk::evaluate(
            current_equity,
            starting_balance,
            state.instance.anchor.equity,
            &thresholds,
        );

        let mut trades = state.ledger.trades().to_vec();
        trades.reverse(); // newest first

        Ok(ChallengeSummary {
            challenge_id,
            user_id: state.instance.user_id,
            plan_name: state.instance.plan_name.clone(),
            status: state.instance.status,
            created_at: state.instance.created_at,
            ended_at: state.instance.ended_at,
            starting_balance,
            equity: current_equity,
            thresholds,
            profit_pct: report.profit_pct,
            daily_loss_pct: report.daily_loss_pct,
            total_loss_pct: report.total_loss_pct,
            trades,
        })
    }

    /// Monthly leaderboard over every challenge with period activity. Cells
    /// are locked one at a time, so the trade path is never blocked for more
    /// than one snapshot.
    pub fn leaderboard(&self, period: &Period) -> Vec<LeaderboardEntry> {
        let cells: Vec<_> = {
            let cells = self.cells.read().unwrap_or_else(|e| e.into_inner());
            cells.values().cloned().collect()
        };
        let users = {
            let users = self.users.read().unwrap_or_else(|e| e.into_inner());
            users.clone()
        };

        let mut inputs = Vec::with_capacity(cells.len());
        for cell in cells {
            let state = cell.lock().unwrap_or_else(|e| e.into_inner());
            let user_email = users
                .get(&state.instance.user_id)
                .cloned()
                .unwrap_or_default();
            inputs.push(RankingInput {
                challenge_id: state.instance.id,
                user_email,
                starting_balance: state.instance.plan.starting_balance,
                created_at: state.instance.created_at,
                trade_pnls: state
                    .ledger
                    .trades()
                    .iter()
                    .map(|t| (t.timestamp, t.realized_pnl.unwrap_or_else(Money::zero)))
                    .collect(),
            });
        }

        rank(&inputs, period)
    }

    /// Back-office table: every challenge, sorted by id.
    pub fn admin_challenges(&self) -> Vec<AdminChallengeRow> {
        let cells: Vec<_> = {
            let cells = self.cells.read().unwrap_or_else(|e| e.into_inner());
            cells.values().cloned().collect()
        };
        let users = {
            let users = self.users.read().unwrap_or_else(|e| e.into_inner());
            users.clone()
        };

        let mut rows: Vec<AdminChallengeRow> = cells
            .into_iter()
            .map(|cell| {
                let state = cell.lock().unwrap_or_else(|e| e.into_inner());
                AdminChallengeRow {
                    challenge_id: state.instance.id,
                    user_id: state.instance.user_id,
                    user_email: users
                        .get(&state.instance.user_id)
                        .cloned()
                        .unwrap_or_default(),
                    plan_name: state.instance.plan_name.clone(),
                    status: state.instance.status,
                    equity: equity(state.instance.plan.starting_balance, &state.ledger),
                }
            })
            .collect();
        rows.sort_by_key(|r| r.challenge_id);
        rows
    }

    /// The user's open challenge, if any. Lowest id wins when several exist.
    pub fn active_challenge_for(&self, user_id: UserId) -> Option<ChallengeId> {
        let cells: Vec<_> = {
            let cells = self.cells.read().unwrap_or_else(|e| e.into_inner());
            cells.values().cloned().collect()
        };

        cells
            .into_iter()
            .filter_map(|cell| {
                let state = cell.lock().unwrap_or_else(|e| e.into_inner());
                (state.instance.user_id == user_id && state.instance.is_active())
                    .then_some(state.instance.id)
            })
            .min()
    }
}
