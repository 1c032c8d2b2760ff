use std::collections::HashMap;

use goals_dao::{GoalsDataset, json::SellerYear};
use goals_models::{
    CustomerClass, LiveEntry, LiveFragment, MergedRecord, PeriodicEntry,
    PeriodicFragment, StaticEntry, StaticFragment,
};

pub const SELLER: &str = "S1";
pub const YEAR: i32 = 2026;
pub const MONTH: u32 = 10;

/// Class C customers named after their ids.
pub fn static_entries(targets: &[(&str, f64)]) -> StaticFragment {
    targets
        .iter()
        .map(|&(id, target)| {
            (
                id.to_string(),
                StaticEntry::builder().name(id).target(target).build(),
            )
        })
        .collect()
}

pub fn classified_entries(
    targets: &[(&str, CustomerClass, f64)],
) -> StaticFragment {
    targets
        .iter()
        .map(|&(id, class, target)| {
            (
                id.to_string(),
                StaticEntry::builder()
                    .name(id)
                    .class(class)
                    .target(target)
                    .build(),
            )
        })
        .collect()
}

/// One order per customer with a positive amount.
pub fn periodic(actuals: &[(&str, f64)]) -> PeriodicFragment {
    actuals
        .iter()
        .map(|&(id, actual)| {
            (
                id.to_string(),
                PeriodicEntry::builder()
                    .actual_to_date(actual)
                    .orders_to_date(u64::from(actual > 0.0))
                    .build(),
            )
        })
        .collect()
}

/// One order per customer with a positive amount.
pub fn live(actuals: &[(&str, f64)]) -> LiveFragment {
    actuals
        .iter()
        .map(|&(id, actual)| {
            (
                id.to_string(),
                LiveEntry::builder()
                    .sub_period_actual(actual)
                    .sub_period_orders(u64::from(actual > 0.0))
                    .build(),
            )
        })
        .collect()
}

pub fn merged_record(
    id: &str, target: f64, actual: f64, sub_period_actual: f64,
) -> MergedRecord {
    MergedRecord {
        customer_id: id.to_string(),
        name: id.to_string(),
        class: CustomerClass::C,
        target,
        actual_to_date: actual,
        orders_to_date: u64::from(actual > 0.0),
        last_order_date: None,
        sub_period_actual,
        sub_period_orders: u64::from(sub_period_actual > 0.0),
        last_activity_date: None,
    }
}

/// Dataset holding one seller-year.
pub fn dataset(
    seller: &str, year: i32, data: SellerYear,
) -> GoalsDataset {
    GoalsDataset {
        sellers: HashMap::from([(
            seller.to_string(),
            HashMap::from([(year, data)]),
        )]),
    }
}

/// Three customers of seller `S1` in October 2026: A (target 100, 40 sold),
/// B (target 200, nothing this year but 5 this month) and C (target 50,
/// fully met).
pub fn scenario_dataset() -> GoalsDataset {
    dataset(
        SELLER,
        YEAR,
        SellerYear {
            static_tier: classified_entries(&[
                ("A", CustomerClass::A, 100.0),
                ("B", CustomerClass::B, 200.0),
                ("C", CustomerClass::C, 50.0),
            ]),
            periodic: periodic(&[("A", 40.0), ("C", 50.0)]),
            live: HashMap::from([(MONTH, live(&[("B", 5.0)]))]),
        },
    )
}
