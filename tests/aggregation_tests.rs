//! Analytics Core Integration Tests
//!
//! Exercises the store and aggregator together through the public API:
//! - Time range queries and insertion order
//! - Bounded per-type time series
//! - Last-write-wins recent values
//! - Window refresh replacing incremental counters
//! - Snapshot delivery to listeners

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use tokio::sync::mpsc;

use realtime_analytics::{
    AggregatorConfig, EventStore, Metrics, MetricsAggregator, Payload, Value,
};

fn setup() -> (Arc<EventStore>, Arc<MetricsAggregator>) {
    let store = Arc::new(EventStore::new());
    let aggregator = MetricsAggregator::new(store.clone());
    (store, aggregator)
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
}

#[test]
fn test_sales_range_query() {
    let (store, _aggregator) = setup();
    let (t0, t1, t2) = (at(9, 0), at(9, 5), at(9, 10));

    store.store(Payload::new("sales", "test").at(t0).with_value("amount", 100)).unwrap();
    store.store(Payload::new("sales", "test").at(t1).with_value("amount", 200)).unwrap();
    store.store(Payload::new("sales", "test").at(t2).with_value("amount", 300)).unwrap();

    let data = store.get_data(t0);
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].timestamp, t1);
    assert_eq!(data[0].values["amount"], Value::Int(200));
    assert_eq!(data[1].timestamp, t2);
    assert_eq!(data[1].values["amount"], Value::Int(300));
}

#[test]
fn test_users_series_evicts_first_point() {
    let (store, aggregator) = setup();

    for i in 0..101 {
        store
            .store(
                Payload::new("users", "test")
                    .at(at(10, 0) + ChronoDuration::seconds(i))
                    .with_value("active", i),
            )
            .unwrap();
    }

    let metrics = aggregator.get_metrics();
    let series = metrics.series("users").expect("users series");
    assert_eq!(series.len(), 100);
    assert_eq!(series[0].timestamp, at(10, 0) + ChronoDuration::seconds(1));
    assert_eq!(series[0].values["active"], Value::Int(1));
}

#[test]
fn test_series_order_ignores_event_timestamps() {
    let (store, aggregator) = setup();

    // Descending timestamps, like backfilled mock data
    for i in 0..105 {
        store
            .store(
                Payload::new("sales", "test")
                    .at(at(12, 0) - ChronoDuration::minutes(i))
                    .with_value("seq", i),
            )
            .unwrap();
    }

    let metrics = aggregator.get_metrics();
    let seqs: Vec<i64> = metrics
        .series("sales")
        .unwrap()
        .iter()
        .filter_map(|p| p.values["seq"].as_i64())
        .collect();
    assert_eq!(seqs, (5..105).collect::<Vec<i64>>());
}

#[test]
fn test_recent_value_last_write_wins() {
    let (store, aggregator) = setup();

    store
        .store(Payload::new("sales", "test").at(at(15, 0)).with_value("amount", 100))
        .unwrap();
    // Older timestamp, but stored later
    store
        .store(Payload::new("sales", "test").at(at(8, 0)).with_value("amount", 200))
        .unwrap();

    let metrics = aggregator.get_metrics();
    assert_eq!(metrics.recent_values["sales.amount"], Value::Int(200));
}

#[test]
fn test_recent_values_namespaced_by_type() {
    let (store, aggregator) = setup();

    store.store(Payload::new("sales", "test").with_value("region", "Europe")).unwrap();
    store.store(Payload::new("users", "test").with_value("region", "Asia")).unwrap();

    let metrics = aggregator.get_metrics();
    assert_eq!(metrics.recent_values["sales.region"], Value::from("Europe"));
    assert_eq!(metrics.recent_values["users.region"], Value::from("Asia"));
}

#[test]
fn test_window_refresh_replaces_total() {
    let (store, aggregator) = setup();
    let now = Utc::now();

    // Three inside the last hour, two outside it
    for minutes in [10, 30, 55, 80, 115] {
        store
            .store(Payload::new("sales", "test").at(now - ChronoDuration::minutes(minutes)))
            .unwrap();
    }
    assert_eq!(aggregator.get_metrics().total_events, 5);

    aggregator.refresh_window();
    assert_eq!(aggregator.get_metrics().total_events, 3);

    // The next stored event counts on top of the window total
    store.store(Payload::new("sales", "test")).unwrap();
    assert_eq!(aggregator.get_metrics().total_events, 4);
}

#[test]
fn test_custom_window_length() {
    let store = Arc::new(EventStore::new());
    let config = AggregatorConfig {
        window: Duration::from_secs(15 * 60),
        ..Default::default()
    };
    let aggregator = MetricsAggregator::with_config(store.clone(), config);
    let now = Utc::now();

    store.store(Payload::new("users", "test").at(now - ChronoDuration::minutes(5))).unwrap();
    store.store(Payload::new("users", "test").at(now - ChronoDuration::minutes(20))).unwrap();

    aggregator.refresh_window();
    assert_eq!(aggregator.get_metrics().events_by_type["users"], 1);
}

#[test]
fn test_mock_data_feeds_aggregator() {
    let (store, aggregator) = setup();
    store.generate_mock_data(10).unwrap();

    let metrics = aggregator.get_metrics();
    assert_eq!(metrics.total_events, 20);
    assert_eq!(metrics.events_by_type["sales"], 10);
    assert_eq!(metrics.events_by_type["users"], 10);
    // Last stored pair is the oldest one
    assert_eq!(metrics.recent_values["sales.amount"], Value::Int(109));
    assert_eq!(metrics.recent_values["users.active"], Value::Int(59));
}

#[test]
fn test_concurrent_producers() {
    let (store, aggregator) = setup();

    std::thread::scope(|scope| {
        for producer in 0..8 {
            let store = store.clone();
            scope.spawn(move || {
                for i in 0..50 {
                    store
                        .store(
                            Payload::new(format!("type{}", producer % 2), "test")
                                .with_value("n", i),
                        )
                        .unwrap();
                }
            });
        }
    });

    let metrics = aggregator.get_metrics();
    assert_eq!(metrics.total_events, 400);
    assert_eq!(metrics.events_by_type["type0"], 200);
    assert_eq!(metrics.events_by_type["type1"], 200);
    assert!(metrics.time_series_data.values().all(|s| s.len() <= 100));
}

#[tokio::test]
async fn test_listeners_see_both_update_paths() {
    let (store, aggregator) = setup();
    let (tx, mut rx) = mpsc::unbounded_channel::<Metrics>();
    aggregator.add_listener(move |metrics: &Metrics| {
        let _ = tx.send(metrics.clone());
    });

    let handle = aggregator.start().unwrap();

    store
        .store(Payload::new("sales", "test").at(Utc::now() - ChronoDuration::hours(2)))
        .unwrap();
    let incremental = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("Timeout waiting for incremental snapshot")
        .unwrap();
    assert_eq!(incremental.total_events, 1);

    aggregator.refresh_window();
    let periodic = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("Timeout waiting for periodic snapshot")
        .unwrap();
    assert_eq!(periodic.total_events, 0);
    assert_eq!(periodic.series("sales").unwrap().len(), 1);

    aggregator.stop();
    aggregator.stop();
    handle.await.unwrap();
}
