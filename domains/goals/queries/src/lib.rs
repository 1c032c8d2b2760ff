use std::fmt;

use chrono::{Datelike, NaiveDate};
use goals_errors::GoalsError;
use goals_models::{CustomerClass, RankOrder};
use serde::Deserialize;
use tiered_cache::is_valid_segment;
use typed_builder::TypedBuilder;

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// Request for one seller's customer-goals view.
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
pub struct GoalsQuery {
    #[builder(setter(into))]
    pub seller_id: String,
    pub year: i32,
    /// Defaults to the current month for the current year, December for
    /// past years and January for future ones.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub month: Option<u32>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub classification: Option<CustomerClass>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub order_by: Option<String>,
}

/// Classification filter as it appears in a scope key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassFilter(pub Option<CustomerClass>);

impl fmt::Display for ClassFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(class) => f.write_str(class.as_str()),
            None => f.write_str("all"),
        }
    }
}

/// Parameters shared by the static and periodic tiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct YearScope {
    pub seller_id: String,
    pub year: i32,
    pub classification: ClassFilter,
}

/// Parameters of the live tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonthScope {
    pub period: YearScope,
    pub month: u32,
}

/// A validated query, split into the partitions each tier caches under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalsScope {
    pub period: YearScope,
    pub sub_period: MonthScope,
    pub order_by: RankOrder,
}

impl GoalsQuery {
    /// Validates the query and resolves its defaults against `today`.
    pub fn into_scope(self, today: NaiveDate) -> Result<GoalsScope, GoalsError> {
        if !is_valid_segment(&self.seller_id) {
            return Err(GoalsError::invalid_scope(
                "seller_id",
                "must be non-empty without ':' or whitespace",
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(GoalsError::invalid_scope(
                "year",
                format!("{} is outside {MIN_YEAR}..={MAX_YEAR}", self.year),
            ));
        }
        let month = match self.month {
            Some(month @ 1..=12) => month,
            Some(month) => {
                return Err(GoalsError::invalid_scope(
                    "month",
                    format!("{month} is outside 1..=12"),
                ));
            }
            None if self.year == today.year() => today.month(),
            None if self.year < today.year() => 12,
            None => 1,
        };
        let order_by = match self.order_by.as_deref() {
            Some(name) => name.parse::<RankOrder>()?,
            None => RankOrder::default(),
        };

        let period = YearScope {
            seller_id: self.seller_id,
            year: self.year,
            classification: ClassFilter(self.classification),
        };
        Ok(GoalsScope {
            sub_period: MonthScope {
                period: period.clone(),
                month,
            },
            period,
            order_by,
        })
    }
}
