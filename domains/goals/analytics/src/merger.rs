use goals_models::{
    LiveEntry, LiveFragment, MergedRecord, PeriodicEntry, PeriodicFragment,
    StaticFragment,
};
use tracing::debug;

/// Joins the three tier fragments on customer id.
///
/// The static fragment is the identity source: each of its customers yields
/// exactly one record, and customers that only appear in the periodic or live
/// fragments are dropped. Output order is unspecified.
pub fn merge(
    static_fragment: &StaticFragment, periodic: &PeriodicFragment,
    live: &LiveFragment,
) -> Vec<MergedRecord> {
    let no_sales = PeriodicEntry::default();
    let no_activity = LiveEntry::default();

    let merged: Vec<MergedRecord> = static_fragment
        .entities
        .iter()
        .map(|(customer_id, identity)| {
            let to_date = periodic.get(customer_id).unwrap_or(&no_sales);
            let current = live.get(customer_id).unwrap_or(&no_activity);

            MergedRecord {
                customer_id: customer_id.clone(),
                name: identity.name.clone(),
                class: identity.class,
                target: identity.target,
                actual_to_date: to_date.actual_to_date,
                orders_to_date: to_date.orders_to_date,
                last_order_date: to_date.last_order_date,
                sub_period_actual: current.sub_period_actual,
                sub_period_orders: current.sub_period_orders,
                last_activity_date: current.last_activity_date,
            }
        })
        .collect();

    let orphaned = periodic
        .entities
        .keys()
        .chain(live.entities.keys())
        .filter(|id| !static_fragment.entities.contains_key(*id))
        .count();
    if orphaned > 0 {
        debug!(orphaned, "dropped fragment entries without a static identity");
    }

    merged
}
