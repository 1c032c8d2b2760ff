use goals_models::{ClassifiedRecord, RankingResult, Tier, Totals};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How each tier was served for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheDiagnostics {
    pub static_hit: bool,
    pub periodic_hit: bool,
    pub live_hit: bool,
    pub query_time_ms: u64,
    /// Tiers replaced by an empty fragment after their computation failed.
    pub failed_tiers: Vec<Tier>,
    pub degraded: bool,
}

impl CacheDiagnostics {
    pub fn hit(&self, tier: Tier) -> bool {
        match tier {
            Tier::Static => self.static_hit,
            Tier::Periodic => self.periodic_hit,
            Tier::Live => self.live_hit,
        }
    }

    pub fn set_hit(&mut self, tier: Tier, hit: bool) {
        match tier {
            Tier::Static => self.static_hit = hit,
            Tier::Periodic => self.periodic_hit = hit,
            Tier::Live => self.live_hit = hit,
        }
    }

    pub fn record_failure(&mut self, tier: Tier) {
        self.failed_tiers.push(tier);
        self.degraded = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalsResponse {
    pub entities: Vec<ClassifiedRecord>,
    pub summary: Totals,
    pub ranking: RankingResult,
    pub cache: CacheDiagnostics,
}
