use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::customers::{CustomerClass, EntityId};

/// One customer's view across all three tiers.
///
/// Fields sourced from the periodic and live tiers hold neutral values (zero
/// amounts and counts, no dates) when that tier had nothing for the customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergedRecord {
    pub customer_id: EntityId,
    pub name: String,
    pub class: CustomerClass,
    pub target: f64,
    pub actual_to_date: f64,
    pub orders_to_date: u64,
    pub last_order_date: Option<NaiveDate>,
    pub sub_period_actual: f64,
    pub sub_period_orders: u64,
    pub last_activity_date: Option<NaiveDate>,
}

impl MergedRecord {
    pub fn has_sub_period_activity(&self) -> bool {
        self.sub_period_orders > 0 || self.sub_period_actual > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub merged: MergedRecord,
    pub gap: f64,
    pub achievement_percent: i64,
    pub sub_period_target: f64,
    pub sub_period_gap: f64,
    pub sub_period_achievement_percent: i64,
    pub pipeline_minimum: f64,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    OnTarget,
    Warning,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub derived: DerivedRecord,
    pub status: Status,
}

impl ClassifiedRecord {
    pub fn customer_id(&self) -> &str { &self.derived.merged.customer_id }
}

/// Named comparator used to order classified records.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// Inactive customers first, then by gap, target and class.
    #[default]
    Attention,
    Gap,
    Target,
    Achievement,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown ranking order `{0}`")]
pub struct ParseOrderError(pub String);

impl RankOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attention => "attention",
            Self::Gap => "gap",
            Self::Target => "target",
            Self::Achievement => "achievement",
        }
    }
}

impl fmt::Display for RankOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankOrder {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attention" | "priority" => Ok(Self::Attention),
            "gap" => Ok(Self::Gap),
            "target" => Ok(Self::Target),
            "achievement" | "achievement_percent" => Ok(Self::Achievement),
            _ => Err(ParseOrderError(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedRecord {
    /// 1-based position.
    pub rank: u32,
    #[serde(flatten)]
    pub record: ClassifiedRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingResult {
    pub order_by: RankOrder,
    pub records: Vec<RankedRecord>,
}

impl RankingResult {
    pub fn customer_ids(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|ranked| ranked.record.customer_id())
            .collect()
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub on_target: u64,
    pub warning: u64,
    pub critical: u64,
}

/// Portfolio-level reduction of the classified records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub entity_count: u64,
    pub total_target: f64,
    pub total_actual: f64,
    pub total_sub_period_actual: f64,
    pub active_count: u64,
    pub activity_rate: f64,
    pub achievement_percent: i64,
    pub status_counts: StatusCounts,
}
