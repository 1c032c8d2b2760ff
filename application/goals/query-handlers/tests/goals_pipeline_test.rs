use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use futures::future::join_all;
use goals_errors::GoalsError;
use goals_models::{ClassifiedRecord, CustomerClass, Status, Tier};
use goals_queries::GoalsQuery;
use goals_query_handlers::{FailurePolicy, GoalsConfig, GoalsQueryHandler};
use goals_responses::GoalsResponse;
use test_utils::{
    InMemoryGoalsRepository,
    fixtures::{MONTH, SELLER, YEAR, live, scenario_dataset},
    init_test_tracing,
};

fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 18).unwrap() }

fn setup(
    config: GoalsConfig,
) -> (Arc<InMemoryGoalsRepository>, GoalsQueryHandler) {
    init_test_tracing();
    let repo = Arc::new(InMemoryGoalsRepository::new(scenario_dataset()));
    let handler = GoalsQueryHandler::new(repo.clone(), &config).unwrap();
    (repo, handler)
}

fn query() -> GoalsQuery {
    GoalsQuery::builder().seller_id(SELLER).year(YEAR).build()
}

fn entity<'a>(response: &'a GoalsResponse, id: &str) -> &'a ClassifiedRecord {
    response
        .entities
        .iter()
        .find(|record| record.customer_id() == id)
        .unwrap()
}

fn hits(response: &GoalsResponse) -> [bool; 3] {
    Tier::ALL.map(|tier| response.cache.hit(tier))
}

#[tokio::test]
async fn test_scenario_merges_derives_and_ranks() {
    let (_, handler) = setup(GoalsConfig::default());

    let response = handler.execute_at(query(), today()).await.unwrap();

    let gaps: Vec<(&str, f64)> = response
        .entities
        .iter()
        .map(|record| (record.customer_id(), record.derived.gap))
        .collect();
    assert_eq!(gaps, [("A", 60.0), ("B", 200.0), ("C", 0.0)]);

    let b = entity(&response, "B");
    assert_eq!(b.derived.merged.actual_to_date, 0.0);
    assert_eq!(b.derived.merged.sub_period_actual, 5.0);
    assert_eq!(entity(&response, "A").status, Status::Critical);
    assert_eq!(b.status, Status::Critical);
    assert_eq!(entity(&response, "C").status, Status::OnTarget);

    // B sold this month, so the customers without activity lead.
    assert_eq!(response.ranking.customer_ids(), ["A", "C", "B"]);
    let ranks: Vec<u32> =
        response.ranking.records.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, [1, 2, 3]);

    assert_eq!(response.summary.entity_count, 3);
    assert_eq!(response.summary.total_target, 350.0);
    assert_eq!(response.summary.total_actual, 90.0);
    assert_eq!(response.summary.total_sub_period_actual, 5.0);
    assert_eq!(response.summary.active_count, 1);
    assert_eq!(response.summary.achievement_percent, 26);
    assert_eq!(response.summary.status_counts.critical, 2);
    assert!(!response.cache.degraded);
}

#[tokio::test]
async fn test_without_live_activity_attention_follows_gap() {
    let (_, handler) = setup(GoalsConfig::default());
    let september = GoalsQuery::builder()
        .seller_id(SELLER)
        .year(YEAR)
        .month(9)
        .build();

    let response = handler.execute_at(september, today()).await.unwrap();

    assert_eq!(response.summary.active_count, 0);
    assert_eq!(response.ranking.customer_ids(), ["B", "A", "C"]);
}

#[tokio::test]
async fn test_named_orders_share_cached_fragments() {
    let (repo, handler) = setup(GoalsConfig::default());

    let attention = handler.execute_at(query(), today()).await.unwrap();
    let by_target = handler
        .execute_at(
            GoalsQuery::builder()
                .seller_id(SELLER)
                .year(YEAR)
                .order_by("target")
                .build(),
            today(),
        )
        .await
        .unwrap();

    assert_eq!(hits(&attention), [false, false, false]);
    assert_eq!(hits(&by_target), [true, true, true]);
    assert_eq!(repo.total_calls(), 3);
    assert_eq!(by_target.ranking.customer_ids(), ["B", "A", "C"]);
    assert_eq!(by_target.entities, attention.entities);
}

#[tokio::test(start_paused = true)]
async fn test_tiers_expire_independently() {
    let (repo, handler) = setup(GoalsConfig::default());

    let first = handler.execute_at(query(), today()).await.unwrap();
    assert_eq!(hits(&first), [false, false, false]);

    repo.update(|dataset| {
        let data = dataset
            .sellers
            .get_mut(SELLER)
            .and_then(|years| years.get_mut(&YEAR))
            .unwrap();
        data.live.insert(MONTH, live(&[("A", 12.0), ("B", 5.0)]));
    });

    tokio::time::advance(Duration::from_secs(59)).await;
    let cached = handler.execute_at(query(), today()).await.unwrap();
    assert_eq!(hits(&cached), [true, true, true]);
    assert_eq!(entity(&cached, "A").derived.merged.sub_period_actual, 0.0);

    tokio::time::advance(Duration::from_secs(2)).await;
    let live_refreshed = handler.execute_at(query(), today()).await.unwrap();
    assert_eq!(hits(&live_refreshed), [true, true, false]);
    assert_eq!(
        entity(&live_refreshed, "A").derived.merged.sub_period_actual,
        12.0
    );
    assert_eq!(live_refreshed.ranking.customer_ids(), ["C", "B", "A"]);

    tokio::time::advance(Duration::from_secs(240)).await;
    let periodic_refreshed =
        handler.execute_at(query(), today()).await.unwrap();
    assert_eq!(hits(&periodic_refreshed), [true, false, false]);

    assert_eq!(repo.calls(Tier::Static), 1);
    assert_eq!(repo.calls(Tier::Periodic), 2);
    assert_eq!(repo.calls(Tier::Live), 3);
}

#[tokio::test]
async fn test_failed_tier_degrades_and_is_not_cached() {
    let (repo, handler) = setup(GoalsConfig::default());
    repo.set_failing(Tier::Live, true);

    let degraded = handler.execute_at(query(), today()).await.unwrap();

    assert!(degraded.cache.degraded);
    assert_eq!(degraded.cache.failed_tiers, [Tier::Live]);
    assert_eq!(degraded.entities.len(), 3);
    assert_eq!(degraded.summary.active_count, 0);
    assert_eq!(entity(&degraded, "A").derived.gap, 60.0);

    repo.set_failing(Tier::Live, false);
    let recovered = handler.execute_at(query(), today()).await.unwrap();

    assert!(!recovered.cache.degraded);
    assert!(recovered.cache.failed_tiers.is_empty());
    assert_eq!(hits(&recovered), [true, true, false]);
    assert_eq!(recovered.summary.active_count, 1);
    assert_eq!(repo.calls(Tier::Live), 2);
}

#[tokio::test]
async fn test_fail_request_policy_surfaces_tier_error() {
    let config = GoalsConfig {
        failure_policy: FailurePolicy::FailRequest,
        ..GoalsConfig::default()
    };
    let (repo, handler) = setup(config);
    repo.set_failing(Tier::Periodic, true);

    let err = handler.execute_at(query(), today()).await.unwrap_err();

    assert!(matches!(
        err,
        GoalsError::Tier {
            tier: Tier::Periodic,
            ..
        }
    ));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_invalid_requests_never_reach_the_repository() {
    let (repo, handler) = setup(GoalsConfig::default());
    let invalid = [
        GoalsQuery::builder().seller_id("").year(YEAR).build(),
        GoalsQuery::builder().seller_id("S1:all").year(YEAR).build(),
        GoalsQuery::builder().seller_id(SELLER).year(3000).build(),
        GoalsQuery::builder()
            .seller_id(SELLER)
            .year(YEAR)
            .month(0)
            .build(),
        GoalsQuery::builder()
            .seller_id(SELLER)
            .year(YEAR)
            .order_by("alphabetical")
            .build(),
    ];

    for query in invalid {
        let err = handler.execute_at(query, today()).await.unwrap_err();
        assert!(err.is_client_error(), "{err}");
    }
    assert_eq!(repo.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_compute_each_tier_once() {
    let (repo, handler) = setup(GoalsConfig::default());
    for tier in Tier::ALL {
        repo.set_delay(tier, Duration::from_millis(200));
    }

    let requests = (0..8).map(|_| {
        let handler = handler.clone();
        tokio::spawn(async move { handler.execute_at(query(), today()).await })
    });
    let responses = join_all(requests).await;

    for response in responses {
        let response = response.unwrap().unwrap();
        assert_eq!(response.ranking.customer_ids(), ["A", "C", "B"]);
        assert_eq!(hits(&response), [false, false, false]);
    }
    for tier in Tier::ALL {
        assert_eq!(repo.calls(tier), 1, "{tier}");
    }
    let [(_, static_stats), ..] = handler.cache_stats();
    assert_eq!(static_stats.computes, 1);
    assert_eq!(static_stats.coalesced, 7);
}

#[tokio::test]
async fn test_class_filter_is_a_separate_partition() -> anyhow::Result<()> {
    let (repo, handler) = setup(GoalsConfig::default());

    let everyone = handler.execute_at(query(), today()).await?;
    let only_a = handler
        .execute_at(
            GoalsQuery::builder()
                .seller_id(SELLER)
                .year(YEAR)
                .classification(CustomerClass::A)
                .build(),
            today(),
        )
        .await?;

    assert_eq!(everyone.entities.len(), 3);
    assert_eq!(only_a.ranking.customer_ids(), ["A"]);
    assert_eq!(hits(&only_a), [false, false, false]);
    assert_eq!(repo.calls(Tier::Static), 2);
    Ok(())
}
