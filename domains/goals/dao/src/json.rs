use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use goals_models::{
    LiveFragment, PeriodicFragment, StaticFragment, TierFragment,
    fragments::Measured,
};
use goals_queries::{MonthScope, YearScope};
use serde::Deserialize;
use thiserror::Error;
use tiered_cache::BoxError;
use tracing::{debug, instrument};

use crate::GoalsRepository;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fragments of one seller for one year.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellerYear {
    #[serde(rename = "static", default)]
    pub static_tier: StaticFragment,
    #[serde(default)]
    pub periodic: PeriodicFragment,
    /// Live fragments by month number.
    #[serde(default)]
    pub live: HashMap<u32, LiveFragment>,
}

/// Pre-computed fragments, keyed by seller id then year.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalsDataset {
    #[serde(default)]
    pub sellers: HashMap<String, HashMap<i32, SellerYear>>,
}

impl GoalsDataset {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let raw = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    fn seller_year(&self, scope: &YearScope) -> Option<&SellerYear> {
        self.sellers.get(&scope.seller_id)?.get(&scope.year)
    }
}

/// Serves fragments from a [`GoalsDataset`], applying the classification
/// filter the way the reporting queries do.
#[derive(Debug, Clone)]
pub struct JsonGoalsRepository {
    dataset: GoalsDataset,
}

impl JsonGoalsRepository {
    pub fn new(dataset: GoalsDataset) -> Self { Self { dataset } }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Ok(Self::new(GoalsDataset::load(path).await?))
    }

    fn static_for(&self, scope: &YearScope) -> StaticFragment {
        let Some(data) = self.dataset.seller_year(scope) else {
            return StaticFragment::empty();
        };
        data.static_tier
            .entities
            .iter()
            .filter(|(_, entry)| {
                scope.classification.0.is_none_or(|class| entry.class == class)
            })
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }
}

/// Keeps only the customers present in `identities`.
fn restrict<T: Clone + Measured>(
    fragment: &TierFragment<T>, identities: &StaticFragment,
) -> TierFragment<T> {
    fragment
        .entities
        .iter()
        .filter(|(id, _)| identities.entities.contains_key(*id))
        .map(|(id, entry)| (id.clone(), entry.clone()))
        .collect()
}

#[async_trait]
impl GoalsRepository for JsonGoalsRepository {
    #[instrument(skip(self))]
    async fn static_fragment(
        &self, scope: &YearScope,
    ) -> Result<StaticFragment, BoxError> {
        let fragment = self.static_for(scope);
        debug!(customers = fragment.len(), "loaded static fragment");
        Ok(fragment)
    }

    #[instrument(skip(self))]
    async fn periodic_fragment(
        &self, scope: &YearScope,
    ) -> Result<PeriodicFragment, BoxError> {
        let Some(data) = self.dataset.seller_year(scope) else {
            return Ok(PeriodicFragment::empty());
        };
        Ok(restrict(&data.periodic, &self.static_for(scope)))
    }

    #[instrument(skip(self))]
    async fn live_fragment(
        &self, scope: &MonthScope,
    ) -> Result<LiveFragment, BoxError> {
        let Some(fragment) = self
            .dataset
            .seller_year(&scope.period)
            .and_then(|data| data.live.get(&scope.month))
        else {
            return Ok(LiveFragment::empty());
        };
        Ok(restrict(fragment, &self.static_for(&scope.period)))
    }
}

#[cfg(test)]
mod tests {
    use goals_models::CustomerClass;
    use goals_queries::ClassFilter;

    use super::*;

    const DATASET: &str = r#"{
        "sellers": {
            "S1": {
                "2026": {
                    "static": {"entities": {
                        "A": {"name": "Acme", "class": "A", "target": 100.0},
                        "B": {"name": "Brix", "class": "B", "target": 200.0}
                    }},
                    "periodic": {"entities": {
                        "A": {"actual_to_date": 40.0},
                        "B": {"actual_to_date": 10.0}
                    }},
                    "live": {"10": {"entities": {
                        "B": {"sub_period_actual": 5.0, "sub_period_orders": 1}
                    }}}
                }
            }
        }
    }"#;

    fn repository() -> JsonGoalsRepository {
        JsonGoalsRepository::new(serde_json::from_str(DATASET).unwrap())
    }

    fn year(class: Option<CustomerClass>) -> YearScope {
        YearScope {
            seller_id: "S1".into(),
            year: 2026,
            classification: ClassFilter(class),
        }
    }

    #[tokio::test]
    async fn test_class_filter_restricts_every_tier() {
        let repo = repository();
        let scope = year(Some(CustomerClass::B));

        let identities = repo.static_fragment(&scope).await.unwrap();
        let sales = repo.periodic_fragment(&scope).await.unwrap();
        let live = repo
            .live_fragment(&MonthScope {
                period: scope.clone(),
                month: 10,
            })
            .await
            .unwrap();

        assert_eq!(identities.len(), 1);
        assert_eq!(identities.summary.total, 200.0);
        assert!(sales.get("A").is_none());
        assert_eq!(sales.summary.total, 10.0);
        assert_eq!(live.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_scope_yields_empty_fragments() {
        let repo = repository();
        let scope = YearScope {
            seller_id: "S9".into(),
            ..year(None)
        };

        assert!(repo.static_fragment(&scope).await.unwrap().is_empty());
        assert!(repo.periodic_fragment(&scope).await.unwrap().is_empty());
        assert!(
            repo.live_fragment(&MonthScope {
                period: year(None),
                month: 3,
            })
            .await
            .unwrap()
            .is_empty()
        );
    }
}
