use std::{collections::HashMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

use crate::customers::{CustomerClass, EntityId};

/// Staleness class of cached data.
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
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Identity, classification and goal assignment.
    Static,
    /// Cumulative year-to-date sales.
    Periodic,
    /// Activity within the current sub-period.
    Live,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Self::Static, Self::Periodic, Self::Live];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Periodic => "periodic",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier-level totals that are not attributable to a single customer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FragmentSummary {
    pub entity_count: u64,
    pub total: f64,
}

/// A per-customer sub-record that contributes one amount to its fragment's
/// summary.
pub trait Measured {
    fn measure(&self) -> f64;
}

/// Output of one tier's compute callback, keyed by customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierFragment<T> {
    #[serde(default = "HashMap::new")]
    pub entities: HashMap<EntityId, T>,
    #[serde(default)]
    pub summary: FragmentSummary,
}

impl<T> Default for TierFragment<T> {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
            summary: FragmentSummary::default(),
        }
    }
}

impl<T> TierFragment<T> {
    /// The stand-in for a tier whose computation failed.
    pub fn empty() -> Self { Self::default() }

    pub fn get(&self, id: &str) -> Option<&T> { self.entities.get(id) }

    pub fn len(&self) -> usize { self.entities.len() }

    pub fn is_empty(&self) -> bool { self.entities.is_empty() }
}

impl<T: Measured> FromIterator<(EntityId, T)> for TierFragment<T> {
    fn from_iter<I: IntoIterator<Item = (EntityId, T)>>(iter: I) -> Self {
        let entities: HashMap<EntityId, T> = iter.into_iter().collect();
        let summary = FragmentSummary {
            entity_count: entities.len() as u64,
            total: entities.values().map(Measured::measure).sum(),
        };
        Self { entities, summary }
    }
}

#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder, ToSchema,
)]
pub struct StaticEntry {
    #[builder(setter(into))]
    pub name: String,
    #[builder(default = CustomerClass::C)]
    pub class: CustomerClass,
    /// Goal for the whole period.
    pub target: f64,
}

#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    TypedBuilder,
    ToSchema,
)]
pub struct PeriodicEntry {
    #[builder(default)]
    #[serde(default)]
    pub actual_to_date: f64,
    #[builder(default)]
    #[serde(default)]
    pub orders_to_date: u64,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub last_order_date: Option<NaiveDate>,
}

#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    TypedBuilder,
    ToSchema,
)]
pub struct LiveEntry {
    #[builder(default)]
    #[serde(default)]
    pub sub_period_actual: f64,
    #[builder(default)]
    #[serde(default)]
    pub sub_period_orders: u64,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
}

impl Measured for StaticEntry {
    fn measure(&self) -> f64 { self.target }
}

impl Measured for PeriodicEntry {
    fn measure(&self) -> f64 { self.actual_to_date }
}

impl Measured for LiveEntry {
    fn measure(&self) -> f64 { self.sub_period_actual }
}

pub type StaticFragment = TierFragment<StaticEntry>;
pub type PeriodicFragment = TierFragment<PeriodicEntry>;
pub type LiveFragment = TierFragment<LiveEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_builds_the_summary() {
        let fragment: StaticFragment = [
            ("A".to_string(), StaticEntry::builder().name("Acme").target(100.0).build()),
            ("B".to_string(), StaticEntry::builder().name("Brix").target(200.0).build()),
        ]
        .into_iter()
        .collect();

        assert_eq!(fragment.len(), 2);
        assert_eq!(fragment.summary.entity_count, 2);
        assert_eq!(fragment.summary.total, 300.0);
        assert_eq!(fragment.get("A").map(|e| e.target), Some(100.0));
    }

    #[test]
    fn fragment_deserializes_without_summary() {
        let fragment: PeriodicFragment = serde_json::from_str(
            r#"{"entities": {"A": {"actual_to_date": 40.0}}}"#,
        )
        .unwrap();

        assert_eq!(fragment.get("A"), Some(&PeriodicEntry::builder().actual_to_date(40.0).build()));
        assert_eq!(fragment.summary, FragmentSummary::default());
    }
}
