// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Offline mode end to end, and the auto-refresh timer.

use satrf_analytics::models::{FiltersUpdate, RangeBound};
use satrf_analytics::services::{
    AnalyticsOptions, AnalyticsService, DataSource, LoadOutcome, Monitoring, MonitoringConfig,
};
use satrf_analytics::views::{ScoreHistoryView, TrendDirection};
use std::time::Duration;
use tokio::time::sleep;

mod common;

#[tokio::test]
async fn test_offline_load_serves_example_dataset() {
    let service = common::offline_service(AnalyticsOptions::default());
    assert!(service.is_offline());

    assert_eq!(service.load_analytics().await, LoadOutcome::Fetched);

    let snapshot = service.snapshot().await;
    let views = snapshot.views();
    let summary = views.summary().unwrap();
    assert_eq!(summary.total_matches, 18);
    assert_eq!(summary.personal_best, 98.0);
    assert_eq!(views.available_disciplines(), ["3P", "Prone", "Air Rifle"]);
    assert!(snapshot.error.is_none());
    assert!(snapshot.last_fetch.is_some());
}

#[tokio::test]
async fn test_discipline_filter_narrows_score_history() {
    let service = common::offline_service(AnalyticsOptions::default());
    service
        .apply_filters(&FiltersUpdate::discipline("3P"))
        .await;

    let snapshot = service.snapshot().await;
    let view = ScoreHistoryView::new(snapshot.views(), &snapshot.filters);

    assert_eq!(view.scores.len(), 2);
    assert!(view.scores.iter().all(|p| p.discipline == "3P"));

    // 95 then 98, no earlier window
    let trend = view.trends.unwrap();
    assert_eq!(trend.current_average, 96.5);
    assert_eq!(trend.trend, TrendDirection::Stable);

    // Discipline stats come from the payload, not recomputed locally
    assert_eq!(snapshot.views().discipline_stats().len(), 3);
}

#[tokio::test]
async fn test_date_bound_update_filters_locally() {
    let service = common::offline_service(AnalyticsOptions::default());

    let range = service
        .update_date_range(RangeBound::Start, "2024-03-01")
        .await;
    assert_eq!(range.start, "2024-03-01");
    service.load_analytics().await;

    let snapshot = service.snapshot().await;
    assert_eq!(snapshot.date_range, range);
    let view = ScoreHistoryView::new(snapshot.views(), &snapshot.filters);
    let dates: Vec<_> = view.scores.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(dates, ["2024-03-05", "2024-04-12"]);
}

#[tokio::test]
async fn test_clearing_a_filter_with_null() {
    let service = common::offline_service(AnalyticsOptions::default());
    service
        .update_filters(&FiltersUpdate::discipline("Prone"))
        .await;

    let update: FiltersUpdate = serde_json::from_str(r#"{"discipline": null}"#).unwrap();
    let filters = service.update_filters(&update).await;
    assert!(filters.discipline.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_auto_refresh_runs_every_interval_until_dropped() {
    let service = AnalyticsService::new(
        DataSource::Offline,
        AnalyticsOptions {
            enable_caching: false,
            auto_refresh: true,
            refresh_interval: Duration::from_secs(300),
            synthetic_delay: Duration::from_millis(10),
            ..Default::default()
        },
        Monitoring::new(MonitoringConfig::default()),
    );

    let handle = service.start_auto_refresh().unwrap();
    assert!(handle.is_running());

    // No immediate run
    sleep(Duration::from_secs(299)).await;
    assert_eq!(service.backend_fetches(), 0);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(service.backend_fetches(), 1);

    sleep(Duration::from_secs(300)).await;
    assert_eq!(service.backend_fetches(), 2);

    handle.stop();
    sleep(Duration::from_secs(1000)).await;
    assert_eq!(service.backend_fetches(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_auto_refresh_uses_cache_when_valid() {
    let service = AnalyticsService::new(
        DataSource::Offline,
        AnalyticsOptions {
            auto_refresh: true,
            refresh_interval: Duration::from_secs(300),
            synthetic_delay: Duration::from_millis(10),
            ..Default::default()
        },
        Monitoring::new(MonitoringConfig::default()),
    );

    service.load_analytics().await;
    let _handle = service.start_auto_refresh().unwrap();

    sleep(Duration::from_secs(301)).await;
    // Tick happened but the entry is still fresh
    assert_eq!(service.backend_fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_is_refetched() {
    let service = common::offline_service(AnalyticsOptions {
        cache_timeout: Duration::from_secs(600),
        ..Default::default()
    });

    assert_eq!(service.load_analytics().await, LoadOutcome::Fetched);

    sleep(Duration::from_secs(599)).await;
    assert_eq!(service.load_analytics().await, LoadOutcome::CacheHit);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(service.load_analytics().await, LoadOutcome::Fetched);
    assert_eq!(service.backend_fetches(), 2);
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_auto_refresh_refetches_after_expiry() {
    let service = AnalyticsService::new(
        DataSource::Offline,
        AnalyticsOptions {
            auto_refresh: true,
            cache_timeout: Duration::from_secs(700),
            refresh_interval: Duration::from_secs(300),
            synthetic_delay: Duration::from_millis(10),
            ..Default::default()
        },
        Monitoring::new(MonitoringConfig::default()),
    );

    service.load_analytics().await;
    let _handle = service.start_auto_refresh().unwrap();

    // Ticks at 300 s and 600 s still find the entry inside its TTL
    sleep(Duration::from_secs(601)).await;
    assert_eq!(service.backend_fetches(), 1);

    // The 900 s tick does not
    sleep(Duration::from_secs(300)).await;
    assert_eq!(service.backend_fetches(), 2);
}
