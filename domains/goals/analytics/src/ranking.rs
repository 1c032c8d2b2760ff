use std::cmp::Ordering;

use goals_models::{
    ClassifiedRecord, DerivedRecord, GoalsPolicy, RankOrder, RankedRecord,
    RankingResult, Status,
};

/// Tri-state status of `actual` against `target`.
///
/// `warn_threshold` is an absolute amount, normally a fraction of `target`.
pub fn classify(actual: f64, target: f64, warn_threshold: f64) -> Status {
    if actual >= target {
        Status::OnTarget
    }
    else if actual >= warn_threshold {
        Status::Warning
    }
    else {
        Status::Critical
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RankingClassifier {
    warn_ratio: f64,
}

impl RankingClassifier {
    pub fn new(policy: &GoalsPolicy) -> Self {
        Self {
            warn_ratio: policy.warn_ratio,
        }
    }

    pub fn classify_record(&self, derived: DerivedRecord) -> ClassifiedRecord {
        let target = derived.merged.target;
        let status = classify(
            derived.merged.actual_to_date,
            target,
            self.warn_ratio * target,
        );
        ClassifiedRecord { derived, status }
    }

    pub fn classify_all(
        &self, derived: Vec<DerivedRecord>,
    ) -> Vec<ClassifiedRecord> {
        derived
            .into_iter()
            .map(|record| self.classify_record(record))
            .collect()
    }
}

/// Orders `records` by the comparator named by `order` and numbers them
/// from 1.
///
/// Every comparator ends with the customer id, so the output does not depend
/// on the input order.
pub fn rank(mut records: Vec<ClassifiedRecord>, order: RankOrder) -> RankingResult {
    records.sort_by(comparator(order));

    RankingResult {
        order_by: order,
        records: records
            .into_iter()
            .zip(1..)
            .map(|(record, rank)| RankedRecord { rank, record })
            .collect(),
    }
}

type Comparator = fn(&ClassifiedRecord, &ClassifiedRecord) -> Ordering;

fn comparator(order: RankOrder) -> Comparator {
    match order {
        RankOrder::Attention => attention_order,
        RankOrder::Gap => by_gap,
        RankOrder::Target => by_target,
        RankOrder::Achievement => by_achievement,
    }
}

fn by_customer_id(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
    a.customer_id().cmp(b.customer_id())
}

/// Customers without activity this sub-period, then larger gap, larger
/// target and class priority.
fn attention_order(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
    let (x, y) = (&a.derived, &b.derived);

    x.merged
        .has_sub_period_activity()
        .cmp(&y.merged.has_sub_period_activity())
        .then_with(|| y.gap.total_cmp(&x.gap))
        .then_with(|| y.merged.target.total_cmp(&x.merged.target))
        .then_with(|| x.merged.class.priority().cmp(&y.merged.class.priority()))
        .then_with(|| by_customer_id(a, b))
}

fn by_gap(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
    b.derived
        .gap
        .total_cmp(&a.derived.gap)
        .then_with(|| by_customer_id(a, b))
}

fn by_target(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
    b.derived
        .merged
        .target
        .total_cmp(&a.derived.merged.target)
        .then_with(|| by_customer_id(a, b))
}

fn by_achievement(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
    b.derived
        .achievement_percent
        .cmp(&a.derived.achievement_percent)
        .then_with(|| by_customer_id(a, b))
}
