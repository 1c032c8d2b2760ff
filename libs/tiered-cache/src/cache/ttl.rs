use std::{
    borrow::Cow,
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, info, instrument};

use super::{
    entry::CacheEntry,
    error::{BoxError, CacheError, CacheResult},
    stats::{CacheStats, StatsCounters},
};
use crate::config::CacheConfig;

type PendingCompute<V> = Shared<BoxFuture<'static, CacheResult<V>>>;

/// Result of [`TtlCache::get_or_set`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<V> {
    pub value: V,
    pub cache_hit: bool,
}

struct State<V> {
    entries: HashMap<String, CacheEntry<V>>,
    in_flight: HashMap<String, PendingCompute<V>>,
}

struct Inner<V> {
    name: Cow<'static, str>,
    config: CacheConfig,
    state: Mutex<State<V>>,
    stats: StatsCounters,
}

/// In-process key/value store with per-entry expiry and a single-flight
/// get-or-compute accessor.
///
/// Cloning is cheap and yields a handle to the same entry table.
pub struct TtlCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Inner<V> {
    fn lock(&self) -> MutexGuard<'_, State<V>> {
        // No invariant spans a panic inside the critical sections, so a
        // poisoned table is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweep(&self, state: &mut State<V>, now: Instant) -> usize {
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_valid_at(now));
        let removed = before - state.entries.len();
        StatsCounters::add(&self.stats.evictions, removed);
        removed
    }

    fn enforce_high_water(&self, state: &mut State<V>) {
        let limit = self.config.high_water_mark;
        if state.entries.len() <= limit {
            return;
        }

        let now = Instant::now();
        let expired = self.sweep(state, now);
        if state.entries.len() <= limit {
            debug!(cache = %self.name, expired, "high-water cleanup");
            return;
        }

        let mut by_expiry: Vec<(Duration, String)> = state
            .entries
            .values()
            .map(|entry| (entry.remaining_at(now), entry.key.clone()))
            .collect();
        by_expiry.sort_unstable();

        let overflow = state.entries.len() - limit;
        for (_, key) in by_expiry.into_iter().take(overflow) {
            state.entries.remove(&key);
        }
        StatsCounters::add(&self.stats.evictions, overflow);
        debug!(cache = %self.name, expired, evicted = overflow, "high-water eviction");
    }

    fn complete(&self, key: &str, result: &CacheResult<V>, ttl: Duration)
    where
        V: Clone,
    {
        let mut state = self.lock();
        state.in_flight.remove(key);
        match result {
            Ok(value) => {
                state.entries.insert(
                    key.to_owned(),
                    CacheEntry::new(key.to_owned(), value.clone(), ttl),
                );
                self.enforce_high_water(&mut state);
            }
            Err(_) => StatsCounters::bump(&self.stats.compute_failures),
        }
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                config,
                state: Mutex::new(State {
                    entries: HashMap::new(),
                    in_flight: HashMap::new(),
                }),
                stats: StatsCounters::default(),
            }),
        }
    }

    pub fn name(&self) -> &str { &self.inner.name }

    pub fn config(&self) -> &CacheConfig { &self.inner.config }

    /// Returns the value stored under `key` if its entry has not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.inner
            .lock()
            .entries
            .get(key)
            .filter(|entry| entry.is_valid_at(now))
            .map(|entry| entry.value.clone())
    }

    /// Stores `value`, replacing any previous entry and restarting its
    /// expiry clock.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let mut state = self.inner.lock();
        state
            .entries
            .insert(key.clone(), CacheEntry::new(key, value, ttl));
        self.inner.enforce_high_water(&mut state);
    }

    /// Returns the cached value for `key`, or runs `compute` and caches its
    /// output for `ttl`.
    ///
    /// Concurrent callers that miss on the same key share one computation:
    /// the first caller registers it and the rest await its result. A
    /// failed computation is returned to every waiter and leaves nothing
    /// behind in the cache.
    #[instrument(skip(self, compute), fields(cache = %self.inner.name))]
    pub async fn get_or_set<F, Fut, E>(
        &self, key: &str, compute: F, ttl: Duration,
    ) -> CacheResult<Fetched<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        if let Some(found) = self.lookup(key) {
            return match found {
                Lookup::Hit(value) => {
                    Ok(Fetched {
                        value,
                        cache_hit: true,
                    })
                }
                Lookup::InFlight(pending) => self.await_pending(pending).await,
            };
        }

        // Build the computation outside the lock, then register it unless
        // another caller got there first.
        let candidate = self.pending(key.to_owned(), compute(), ttl);
        let pending = {
            let mut state = self.inner.lock();
            if let Some(entry) = state.entries.get(key) {
                if entry.is_valid_at(Instant::now()) {
                    StatsCounters::bump(&self.inner.stats.hits);
                    return Ok(Fetched {
                        value: entry.value.clone(),
                        cache_hit: true,
                    });
                }
            }
            StatsCounters::bump(&self.inner.stats.misses);
            match state.in_flight.get(key) {
                Some(existing) => {
                    StatsCounters::bump(&self.inner.stats.coalesced);
                    existing.clone()
                }
                None => {
                    StatsCounters::bump(&self.inner.stats.computes);
                    state.in_flight.insert(key.to_owned(), candidate.clone());
                    candidate
                }
            }
        };
        debug!(key, "cache miss");

        self.await_pending(pending).await
    }

    fn lookup(&self, key: &str) -> Option<Lookup<V>> {
        let now = Instant::now();
        let mut state = self.inner.lock();

        if let Some(entry) = state.entries.get(key) {
            if entry.is_valid_at(now) {
                StatsCounters::bump(&self.inner.stats.hits);
                debug!(key, "cache hit");
                return Some(Lookup::Hit(entry.value.clone()));
            }
            state.entries.remove(key);
            StatsCounters::bump(&self.inner.stats.evictions);
        }

        // Misses without a computation to join are counted once the caller
        // registers under the lock.
        let pending = state.in_flight.get(key)?.clone();
        StatsCounters::bump(&self.inner.stats.misses);
        StatsCounters::bump(&self.inner.stats.coalesced);
        debug!(key, "joining in-flight computation");
        Some(Lookup::InFlight(pending))
    }

    async fn await_pending(
        &self, pending: PendingCompute<V>,
    ) -> CacheResult<Fetched<V>> {
        pending.await.map(|value| {
            Fetched {
                value,
                cache_hit: false,
            }
        })
    }

    fn pending<Fut, E>(
        &self, key: String, compute: Fut, ttl: Duration,
    ) -> PendingCompute<V>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        // Weak so an abandoned computation parked in `in_flight` does not
        // keep the cache alive.
        let inner: Weak<Inner<V>> = Arc::downgrade(&self.inner);
        async move {
            let result = compute
                .await
                .map_err(|err| CacheError::compute(key.as_str(), err));
            if let Some(inner) = inner.upgrade() {
                inner.complete(&key, &result, ttl);
            }
            result
        }
        .boxed()
        .shared()
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    pub fn clear(&self) { self.inner.lock().entries.clear(); }

    /// Physically stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize { self.inner.lock().entries.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn stats(&self) -> CacheStats { self.inner.stats.snapshot() }

    /// Drops every expired entry and returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let mut state = self.inner.lock();
        self.inner.sweep(&mut state, Instant::now())
    }

    /// Sweeps expired entries every `sweep_interval_secs` until the cache is
    /// dropped.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        let period = self.inner.config.sweep_interval();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                let removed = {
                    let mut state = inner.lock();
                    inner.sweep(&mut state, Instant::now())
                };
                if removed > 0 {
                    info!(cache = %inner.name, removed, "swept expired entries");
                }
            }
        })
    }
}

enum Lookup<V> {
    Hit(V),
    InFlight(PendingCompute<V>),
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn cache(high_water_mark: usize) -> TtlCache<u32> {
        TtlCache::new(
            "test",
            CacheConfig {
                high_water_mark,
                sweep_interval_secs: 1,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_is_absent_after_ttl() {
        let cache = cache(100);
        cache.set("k", 7, Duration::from_secs(5));
        assert_eq!(cache.get("k"), Some(7));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(cache.get("k"), None);
        // Still physically present until swept.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.sweep_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_resets_expiry() {
        let cache = cache(100);
        cache.set("k", 1, Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", 2, Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test]
    async fn test_failed_compute_is_not_cached() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let err = cache
            .get_or_set(
                "k",
                move || {
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<u32, _>("database unavailable")
                    }
                },
                Duration::from_secs(60),
            )
            .await
            .unwrap_err();
        assert_eq!(err.key(), "k");
        assert!(err.to_string().contains("database unavailable"));
        assert_eq!(cache.get("k"), None);

        let counter = calls.clone();
        let fetched = cache
            .get_or_set(
                "k",
                move || {
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, BoxError>(9)
                    }
                },
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert_eq!(fetched.value, 9);
        assert!(!fetched.cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().compute_failures, 1);
    }

    #[tokio::test]
    async fn test_value_stored_before_registration_counts_as_hit() {
        let cache = cache(100);
        let calls = Arc::new(AtomicUsize::new(0));

        // The entry lands after the initial lookup but before registration.
        let writer = cache.clone();
        let counter = calls.clone();
        let fetched = cache
            .get_or_set(
                "k",
                move || {
                    writer.set("k", 5, Duration::from_secs(60));
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, BoxError>(6)
                    }
                },
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert_eq!(fetched.value, 5);
        assert!(fetched.cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.computes, 0);

        let computed = cache
            .get_or_set(
                "other",
                || async { Ok::<_, BoxError>(1) },
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert!(!computed.cache_hit);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.computes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_high_water_evicts_expired_then_soonest_expiring() {
        let cache = cache(2);
        cache.set("stale", 0, Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(2)).await;

        cache.set("short", 1, Duration::from_secs(10));
        cache.set("long", 2, Duration::from_secs(100));
        // Over the mark: the expired entry goes first.
        assert_eq!(cache.len(), 2);

        cache.set("medium", 3, Duration::from_secs(50));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("medium"), Some(3));
        assert_eq!(cache.get("long"), Some(2));
        assert_eq!(cache.stats().evictions, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let cache = cache(100);
        cache.set("k", 1, Duration::from_millis(500));
        let handle = cache.spawn_sweeper();

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert!(cache.is_empty());

        handle.abort();
    }
}
