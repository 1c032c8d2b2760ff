use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use goals_cache_keys::TierScope;
use goals_models::{Tier, TierFragment};
use tiered_cache::{
    BoxError, CacheConfig, CacheResult, CacheStats, Fetched, TierConfig,
    TtlCache,
};
use tracing::{debug, instrument};

pub type FragmentFuture<T> =
    BoxFuture<'static, Result<TierFragment<T>, BoxError>>;

type ComputeFn<S, T> = Arc<dyn Fn(S) -> FragmentFuture<T> + Send + Sync>;

/// Serves one tier's fragments from its own cache, computing them on a miss.
pub struct TierFetcher<S, T> {
    tier: Tier,
    cache: TtlCache<Arc<TierFragment<T>>>,
    ttl: Duration,
    compute: ComputeFn<S, T>,
}

impl<S, T> Clone for TierFetcher<S, T> {
    fn clone(&self) -> Self {
        Self {
            tier: self.tier,
            cache: self.cache.clone(),
            ttl: self.ttl,
            compute: self.compute.clone(),
        }
    }
}

impl<S, T> TierFetcher<S, T>
where
    S: TierScope,
    T: Send + Sync + 'static,
{
    pub fn new(
        tier: Tier, cache_config: CacheConfig, ttl: TierConfig,
        compute: impl Fn(S) -> FragmentFuture<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            tier,
            cache: TtlCache::new(tier.as_str(), cache_config),
            ttl: ttl.ttl(),
            compute: Arc::new(compute),
        }
    }

    pub fn tier(&self) -> Tier { self.tier }

    pub fn ttl(&self) -> Duration { self.ttl }

    pub fn cache(&self) -> &TtlCache<Arc<TierFragment<T>>> { &self.cache }

    pub fn stats(&self) -> CacheStats { self.cache.stats() }

    /// The cache key of `scope`, prefixed with the tier name.
    pub fn key(&self, scope: &S) -> String {
        format!("{}:{}", self.tier, scope.scope_key())
    }

    #[instrument(skip_all, fields(tier = %self.tier, key))]
    pub async fn fetch(
        &self, scope: &S,
    ) -> CacheResult<Fetched<Arc<TierFragment<T>>>> {
        let key = self.key(scope);
        tracing::Span::current().record("key", key.as_str());

        let compute = self.compute.clone();
        let scope = scope.clone();
        let fetched = self
            .cache
            .get_or_set(
                &key,
                move || async move { compute(scope).await.map(Arc::new) },
                self.ttl,
            )
            .await?;

        debug!(
            hit = fetched.cache_hit,
            customers = fetched.value.len(),
            "fragment served"
        );
        Ok(fetched)
    }
}
