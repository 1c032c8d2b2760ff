use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use goals_dao::{GoalsDataset, GoalsRepository, JsonGoalsRepository};
use goals_models::{LiveFragment, PeriodicFragment, StaticFragment, Tier};
use goals_queries::{MonthScope, YearScope};
use tiered_cache::BoxError;

#[derive(Default)]
struct Calls {
    static_tier: AtomicUsize,
    periodic: AtomicUsize,
    live: AtomicUsize,
}

impl Calls {
    fn counter(&self, tier: Tier) -> &AtomicUsize {
        match tier {
            Tier::Static => &self.static_tier,
            Tier::Periodic => &self.periodic,
            Tier::Live => &self.live,
        }
    }
}

/// A [`GoalsRepository`] over an in-memory dataset that records how often
/// each tier was computed. Failures and latency can be injected per tier.
#[derive(Default)]
pub struct InMemoryGoalsRepository {
    dataset: Mutex<GoalsDataset>,
    calls: Calls,
    failing: Mutex<HashSet<Tier>>,
    delays: Mutex<HashMap<Tier, Duration>>,
}

impl InMemoryGoalsRepository {
    pub fn new(dataset: GoalsDataset) -> Self {
        Self {
            dataset: Mutex::new(dataset),
            ..Self::default()
        }
    }

    pub fn calls(&self, tier: Tier) -> usize {
        self.calls.counter(tier).load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        Tier::ALL.into_iter().map(|tier| self.calls(tier)).sum()
    }

    /// Makes every later computation of `tier` fail until cleared.
    pub fn set_failing(&self, tier: Tier, failing: bool) {
        let mut set = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing {
            set.insert(tier);
        }
        else {
            set.remove(&tier);
        }
    }

    pub fn set_delay(&self, tier: Tier, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tier, delay);
    }

    /// Replaces the data served by later computations.
    pub fn update(&self, change: impl FnOnce(&mut GoalsDataset)) {
        change(&mut self.dataset.lock().unwrap_or_else(PoisonError::into_inner));
    }

    /// Counts the call, waits out the injected delay and returns a snapshot
    /// of the dataset, or the injected failure.
    async fn begin(&self, tier: Tier) -> Result<JsonGoalsRepository, BoxError> {
        self.calls.counter(tier).fetch_add(1, Ordering::SeqCst);
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tier)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&tier);
        if failing {
            return Err(format!("{tier} query failed").into());
        }
        let dataset = self
            .dataset
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(JsonGoalsRepository::new(dataset))
    }
}

#[async_trait]
impl GoalsRepository for InMemoryGoalsRepository {
    async fn static_fragment(
        &self, scope: &YearScope,
    ) -> Result<StaticFragment, BoxError> {
        self.begin(Tier::Static).await?.static_fragment(scope).await
    }

    async fn periodic_fragment(
        &self, scope: &YearScope,
    ) -> Result<PeriodicFragment, BoxError> {
        self.begin(Tier::Periodic).await?.periodic_fragment(scope).await
    }

    async fn live_fragment(
        &self, scope: &MonthScope,
    ) -> Result<LiveFragment, BoxError> {
        self.begin(Tier::Live).await?.live_fragment(scope).await
    }
}
