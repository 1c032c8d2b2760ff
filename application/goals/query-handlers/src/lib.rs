pub mod config;
pub mod fetcher;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::FutureExt;
use goals_analytics::{
    DerivedFieldCalculator, RankingClassifier, aggregate, merge, rank,
};
use goals_dao::GoalsRepository;
use goals_errors::GoalsError;
use goals_models::{
    LiveEntry, PeriodicEntry, StaticEntry, Tier, TierFragment,
};
use goals_queries::{GoalsQuery, MonthScope, YearScope};
use goals_responses::{CacheDiagnostics, GoalsResponse};
use tiered_cache::{CacheResult, CacheStats, Fetched};
use tokio::{task::JoinHandle, time::Instant};
use tracing::{info, instrument, warn};

pub use crate::{
    config::{FailurePolicy, GoalsConfig, TierTtls},
    fetcher::{FragmentFuture, TierFetcher},
};

/// Builds the customer-goals view of one seller from three independently
/// cached tiers.
#[derive(Clone)]
pub struct GoalsQueryHandler {
    static_fetcher: TierFetcher<YearScope, StaticEntry>,
    periodic_fetcher: TierFetcher<YearScope, PeriodicEntry>,
    live_fetcher: TierFetcher<MonthScope, LiveEntry>,
    calculator: DerivedFieldCalculator,
    classifier: RankingClassifier,
    failure_policy: FailurePolicy,
}

impl GoalsQueryHandler {
    pub fn new(
        repository: Arc<dyn GoalsRepository>, config: &GoalsConfig,
    ) -> Result<Self, GoalsError> {
        config.validate()?;

        let repo = repository.clone();
        let static_fetcher = TierFetcher::new(
            Tier::Static,
            config.cache.clone(),
            config.tiers.static_tier,
            move |scope: YearScope| {
                let repo = repo.clone();
                async move { repo.static_fragment(&scope).await }.boxed()
            },
        );
        let repo = repository.clone();
        let periodic_fetcher = TierFetcher::new(
            Tier::Periodic,
            config.cache.clone(),
            config.tiers.periodic_tier,
            move |scope: YearScope| {
                let repo = repo.clone();
                async move { repo.periodic_fragment(&scope).await }.boxed()
            },
        );
        let live_fetcher = TierFetcher::new(
            Tier::Live,
            config.cache.clone(),
            config.tiers.live_tier,
            move |scope: MonthScope| {
                let repo = repository.clone();
                async move { repo.live_fragment(&scope).await }.boxed()
            },
        );

        Ok(Self {
            static_fetcher,
            periodic_fetcher,
            live_fetcher,
            calculator: DerivedFieldCalculator::new(config.policy),
            classifier: RankingClassifier::new(&config.policy),
            failure_policy: config.failure_policy,
        })
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GoalsQuery,
    ) -> Result<GoalsResponse, GoalsError> {
        self.execute_at(query, Utc::now().date_naive()).await
    }

    /// Runs `query` with `today` as the reference date for month defaults.
    #[instrument(skip(self))]
    pub async fn execute_at(
        &self, query: GoalsQuery, today: NaiveDate,
    ) -> Result<GoalsResponse, GoalsError> {
        let started = Instant::now();
        let scope = query.into_scope(today)?;

        let (static_result, periodic_result, live_result) = tokio::join!(
            self.static_fetcher.fetch(&scope.period),
            self.periodic_fetcher.fetch(&scope.period),
            self.live_fetcher.fetch(&scope.sub_period),
        );

        let mut diagnostics = CacheDiagnostics::default();
        let static_fragment =
            self.settle(Tier::Static, static_result, &mut diagnostics)?;
        let periodic_fragment =
            self.settle(Tier::Periodic, periodic_result, &mut diagnostics)?;
        let live_fragment =
            self.settle(Tier::Live, live_result, &mut diagnostics)?;

        let merged = merge(&static_fragment, &periodic_fragment, &live_fragment);
        let derived = self.calculator.derive_all(merged);
        let mut entities = self.classifier.classify_all(derived);
        entities.sort_by(|a, b| a.customer_id().cmp(b.customer_id()));

        let summary = aggregate(&entities);
        let ranking = rank(entities.clone(), scope.order_by);

        diagnostics.query_time_ms =
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            customers = summary.entity_count,
            static_hit = diagnostics.static_hit,
            periodic_hit = diagnostics.periodic_hit,
            live_hit = diagnostics.live_hit,
            degraded = diagnostics.degraded,
            query_time_ms = diagnostics.query_time_ms,
            "goals view built"
        );

        Ok(GoalsResponse {
            entities,
            summary,
            ranking,
            cache: diagnostics,
        })
    }

    /// Applies the failure policy to one tier's outcome.
    fn settle<T>(
        &self, tier: Tier, result: CacheResult<Fetched<Arc<TierFragment<T>>>>,
        diagnostics: &mut CacheDiagnostics,
    ) -> Result<Arc<TierFragment<T>>, GoalsError> {
        match result {
            Ok(fetched) => {
                diagnostics.set_hit(tier, fetched.cache_hit);
                Ok(fetched.value)
            }
            Err(source) => {
                match self.failure_policy {
                    FailurePolicy::FailRequest => {
                        Err(GoalsError::Tier { tier, source })
                    }
                    FailurePolicy::Degrade => {
                        warn!(%tier, error = %source, "tier unavailable, serving it empty");
                        diagnostics.record_failure(tier);
                        Ok(Arc::new(TierFragment::empty()))
                    }
                }
            }
        }
    }

    pub fn cache_stats(&self) -> [(Tier, CacheStats); 3] {
        [
            (Tier::Static, self.static_fetcher.stats()),
            (Tier::Periodic, self.periodic_fetcher.stats()),
            (Tier::Live, self.live_fetcher.stats()),
        ]
    }

    /// Starts the background expiry sweep of every tier cache.
    pub fn spawn_sweepers(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.static_fetcher.cache().spawn_sweeper(),
            self.periodic_fetcher.cache().spawn_sweeper(),
            self.live_fetcher.cache().spawn_sweeper(),
        ]
    }
}
