use std::borrow::Cow;

use goals_queries::{ClassFilter, MonthScope, YearScope};
use tiered_cache::{ScopeKey, scope_key};

scope_key!(GoalsPeriodKey => "goals:{}:{}:{}"[seller_id: str, year: i32, class: ClassFilter]);
scope_key!(GoalsSubPeriodKey => "goals:{}:{}:{}:{}"[seller_id: str, year: i32, class: ClassFilter, month: u32]);

/// A partition a tier caches under.
pub trait TierScope: Clone + Send + Sync + 'static {
    fn scope_key(&self) -> Cow<'static, str>;
}

impl TierScope for YearScope {
    fn scope_key(&self) -> Cow<'static, str> {
        GoalsPeriodKey.key_with_args((
            self.seller_id.as_str(),
            &self.year,
            &self.classification,
        ))
    }
}

impl TierScope for MonthScope {
    fn scope_key(&self) -> Cow<'static, str> {
        let period = &self.period;
        GoalsSubPeriodKey.key_with_args((
            period.seller_id.as_str(),
            &period.year,
            &period.classification,
            &self.month,
        ))
    }
}
