use goals_models::{ClassifiedRecord, Status, StatusCounts, Totals};

use crate::derived::achievement_percent;

/// Reduces the classified records into portfolio totals in one pass.
pub fn aggregate(records: &[ClassifiedRecord]) -> Totals {
    let mut totals = records.iter().fold(Totals::default(), |mut totals, record| {
        let merged = &record.derived.merged;

        totals.entity_count += 1;
        totals.total_target += merged.target;
        totals.total_actual += merged.actual_to_date;
        totals.total_sub_period_actual += merged.sub_period_actual;
        if merged.has_sub_period_activity() {
            totals.active_count += 1;
        }
        count_status(&mut totals.status_counts, record.status);
        totals
    });

    totals.activity_rate = if totals.entity_count > 0 {
        totals.active_count as f64 / totals.entity_count as f64
    }
    else {
        0.0
    };
    totals.achievement_percent =
        achievement_percent(totals.total_actual, totals.total_target);
    totals
}

fn count_status(counts: &mut StatusCounts, status: Status) {
    match status {
        Status::OnTarget => counts.on_target += 1,
        Status::Warning => counts.warning += 1,
        Status::Critical => counts.critical += 1,
    }
}
