use goals_models::{DerivedRecord, GoalsPolicy, MergedRecord};

/// `round(actual / target * 100)`, or 0 when there is no positive target.
pub fn achievement_percent(actual: f64, target: f64) -> i64 {
    if target > 0.0 {
        (actual / target * 100.0).round() as i64
    }
    else {
        0
    }
}

/// Computes the fields that only exist once the tiers are merged.
///
/// Derived fields are never cached; they are recomputed from the merged
/// record on every read.
#[derive(Debug, Clone, Copy)]
pub struct DerivedFieldCalculator {
    policy: GoalsPolicy,
}

impl DerivedFieldCalculator {
    pub fn new(policy: GoalsPolicy) -> Self { Self { policy } }

    pub fn policy(&self) -> &GoalsPolicy { &self.policy }

    pub fn derive(&self, merged: &MergedRecord) -> DerivedRecord {
        self.derive_owned(merged.clone())
    }

    pub fn derive_all(&self, merged: Vec<MergedRecord>) -> Vec<DerivedRecord> {
        merged
            .into_iter()
            .map(|record| self.derive_owned(record))
            .collect()
    }

    fn derive_owned(&self, merged: MergedRecord) -> DerivedRecord {
        let gap = merged.target - merged.actual_to_date;

        // Fixed policy divisor, not the number of months left in the year.
        let sub_period_target = merged.target / self.policy.sub_period_divisor;

        DerivedRecord {
            gap,
            achievement_percent: achievement_percent(
                merged.actual_to_date,
                merged.target,
            ),
            sub_period_target,
            sub_period_gap: sub_period_target - merged.sub_period_actual,
            sub_period_achievement_percent: achievement_percent(
                merged.sub_period_actual,
                sub_period_target,
            ),
            pipeline_minimum: gap.max(0.0) * self.policy.pipeline_multiplier,
            merged,
        }
    }
}
