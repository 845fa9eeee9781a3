// 8.1 engine/core.rs: engine struct, registration, clock, and the audit log.
// every challenge lives in its own cell so trades on different challenges
// never contend. the cell map itself is only locked for registration and
// lookup.

use super::results::EngineError;
use crate::challenge::ChallengeInstance;
use crate::events::{ChallengeCreatedEvent, Event, EventPayload};
use crate::ledger::TradeLedger;
use crate::plan::{ChallengePlan, PlanSnapshot};
use crate::types::{ChallengeId, EventId, PlanId, Timestamp, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Tuning knobs for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Audit events kept in memory before the oldest are evicted. A challenge
    /// venue emits a handful of events per trade, so this covers weeks of
    /// activity.
    pub max_events: usize,
    /// Print each audit event as it is emitted.
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 10_000,
            verbose: false,
        }
    }
}

/// The mutable state of one challenge: the instance and its ledger, always
/// committed together under the cell lock.
#[derive(Debug)]
pub(super) struct ChallengeState {
    pub instance: ChallengeInstance,
    pub ledger: TradeLedger,
}

#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) plans: RwLock<HashMap<PlanId, ChallengePlan>>,
    pub(super) users: RwLock<HashMap<UserId, String>>,
    pub(super) cells: RwLock<HashMap<ChallengeId, Arc<Mutex<ChallengeState>>>>,
    events: Mutex<Vec<Event>>,
    next_challenge_id: AtomicU64,
    pub(super) next_trade_id: AtomicU64,
    next_event_id: AtomicU64,
    next_user_id: AtomicU64,
    // settable millisecond clock, so scenarios and tests are reproducible
    current_time_ms: AtomicI64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            plans: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            cells: RwLock::new(HashMap::new()),
            events: Mutex::new(Vec::new()),
            next_challenge_id: AtomicU64::new(1),
            next_trade_id: AtomicU64::new(1),
            next_event_id: AtomicU64::new(1),
            next_user_id: AtomicU64::new(1),
            current_time_ms: AtomicI64::new(0),
        }
    }

    pub fn set_time(&self, timestamp: Timestamp) {
        self.current_time_ms
            .store(timestamp.as_millis(), Ordering::Relaxed);
    }

    pub fn time(&self) -> Timestamp {
        Timestamp::from_millis(self.current_time_ms.load(Ordering::Relaxed))
    }

    pub fn advance_time(&self, millis: i64) {
        self.current_time_ms.fetch_add(millis, Ordering::Relaxed);
    }

    pub fn register_plan(&self, plan: ChallengePlan) -> PlanId {
        let id = plan.id;
        let mut plans = self.plans.write().unwrap_or_else(|e| e.into_inner());
        plans.insert(id, plan);
        id
    }

    /// Seed the catalog with the standard Starter/Pro/Elite tiers.
    pub fn seed_default_plans(&self) {
        self.register_plan(ChallengePlan::starter());
        self.register_plan(ChallengePlan::pro());
        self.register_plan(ChallengePlan::elite());
    }

    pub fn register_user(&self, email: &str) -> UserId {
        let id = UserId(self.next_user_id.fetch_add(1, Ordering::Relaxed));
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(id, email.to_string());
        id
    }

    pub fn user_email(&self, user_id: UserId) -> Option<String> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users.get(&user_id).cloned()
    }

    /// Create a challenge instance for a registered user from a catalog plan.
    /// The plan's balance and thresholds are frozen into the instance; the
    /// daily anchor starts at the purchase day with the full starting balance.
    pub fn purchase_challenge(
        &self,
        user_id: UserId,
        plan_id: PlanId,
    ) -> Result<ChallengeId, EngineError> {
        {
            let users = self.users.read().unwrap_or_else(|e| e.into_inner());
            if !users.contains_key(&user_id) {
                return Err(EngineError::UserNotFound(user_id));
            }
        }
        let plan = {
            let plans = self.plans.read().unwrap_or_else(|e| e.into_inner());
            plans
                .get(&plan_id)
                .cloned()
                .ok_or(EngineError::PlanNotFound(plan_id))?
        };
        let snapshot = PlanSnapshot::from_plan(&plan)?;

        let id = ChallengeId(self.next_challenge_id.fetch_add(1, Ordering::Relaxed));
        let instance = ChallengeInstance::new(id, user_id, &plan.name, snapshot, self.time());
        let starting_balance = instance.plan.starting_balance;
        let state = ChallengeState {
            instance,
            ledger: TradeLedger::new(),
        };

        {
            let mut cells = self.cells.write().unwrap_or_else(|e| e.into_inner());
            cells.insert(id, Arc::new(Mutex::new(state)));
        }

        self.emit_event(EventPayload::ChallengeCreated(ChallengeCreatedEvent {
            challenge_id: id,
            user_id,
            plan_name: plan.name,
            starting_balance,
        }));
        Ok(id)
    }

    pub(super) fn cell(
        &self,
        challenge_id: ChallengeId,
    ) -> Result<Arc<Mutex<ChallengeState>>, EngineError> {
        let cells = self.cells.read().unwrap_or_else(|e| e.into_inner());
        cells
            .get(&challenge_id)
            .cloned()
            .ok_or(EngineError::ChallengeNotFound(challenge_id))
    }

    pub fn events(&self) -> Vec<Event> {
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.clone()
    }

    pub fn recent_events(&self, count: usize) -> Vec<Event> {
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        let start = events.len().saturating_sub(count);
        events[start..].to_vec()
    }

    pub(super) fn emit_event(&self, payload: EventPayload) {
        let event = Event::new(
            EventId(self.next_event_id.fetch_add(1, Ordering::Relaxed)),
            self.time(),
            payload,
        );

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.push(event);
        if events.len() > self.config.max_events {
            let drain_count = events.len() - self.config.max_events;
            events.drain(0..drain_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Money;
    use rust_decimal_macros::dec;

    #[test]
    fn purchase_requires_registered_user_and_plan() {
        let engine = Engine::new(EngineConfig::default());
        engine.seed_default_plans();

        let result = engine.purchase_challenge(UserId(99), PlanId(2));
        assert!(matches!(result, Err(EngineError::UserNotFound(_))));

        let user = engine.register_user("trader@example.com");
        let result = engine.purchase_challenge(user, PlanId(42));
        assert!(matches!(result, Err(EngineError::PlanNotFound(_))));

        let id = engine.purchase_challenge(user, PlanId(2)).unwrap();
        assert_eq!(id, ChallengeId(1));
    }

    #[test]
    fn purchase_rejects_bad_catalog_entry() {
        let engine = Engine::new(EngineConfig::default());
        let user = engine.register_user("trader@example.com");
        let mut plan = ChallengePlan::pro();
        plan.starting_balance = Money::new(dec!(0));
        let plan_id = engine.register_plan(plan);

        let result = engine.purchase_challenge(user, plan_id);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
        // nothing was created
        assert!(engine.cells.read().unwrap().is_empty());
    }

    #[test]
    fn clock_is_settable_and_advances() {
        let engine = Engine::new(EngineConfig::default());
        engine.set_time(Timestamp::from_millis(1_000));
        engine.advance_time(500);
        assert_eq!(engine.time().as_millis(), 1_500);
    }

    #[test]
    fn event_log_is_bounded() {
        let config = EngineConfig {
            max_events: 3,
            verbose: false,
        };
        let engine = Engine::new(config);
        engine.seed_default_plans();
        for i in 0..5 {
            let user = engine.register_user(&format!("u{i}@example.com"));
            engine.purchase_challenge(user, PlanId(1)).unwrap();
        }

        let events = engine.events();
        assert_eq!(events.len(), 3);
        // oldest entries were evicted; ids keep rising
        assert_eq!(events.first().unwrap().id, EventId(3));
    }
}
