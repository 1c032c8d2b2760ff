pub mod json;

use async_trait::async_trait;
use goals_models::{LiveFragment, PeriodicFragment, StaticFragment};
use goals_queries::{MonthScope, YearScope};
use tiered_cache::BoxError;

pub use json::{DatasetError, GoalsDataset, JsonGoalsRepository};

/// Source of the three tier fragments.
///
/// Implementations run the expensive aggregate queries. They must not mutate
/// shared state and must tolerate being called repeatedly for the same scope;
/// they are also responsible for bounding their own latency.
#[async_trait]
pub trait GoalsRepository: Send + Sync + 'static {
    /// Customers, classification and period targets.
    async fn static_fragment(
        &self, scope: &YearScope,
    ) -> Result<StaticFragment, BoxError>;

    /// Sales accumulated from the start of the period.
    async fn periodic_fragment(
        &self, scope: &YearScope,
    ) -> Result<PeriodicFragment, BoxError>;

    /// Sales within the sub-period.
    async fn live_fragment(
        &self, scope: &MonthScope,
    ) -> Result<LiveFragment, BoxError>;
}
