use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing_test::traced_test;

use notifier::config::AppConfig;
use notifier::driver::Driver;
use notifier::error::AppError;
use tracker::types::HOUR_MS;
use tracker::{ExtremumTracker, SlotState};

mod mocks;
use mocks::{FlakyStore, RecordingSink, ScriptedQuotes};

fn cfg() -> Arc<AppConfig> {
    Arc::new(
        AppConfig::from_lookup(|k| (k == "BARK_KEY").then(|| "test-key".to_string())).unwrap(),
    )
}

struct Harness {
    driver: Driver,
    quotes: Arc<ScriptedQuotes>,
    sink: Arc<RecordingSink>,
    store: FlakyStore,
}

async fn harness() -> Harness {
    let cfg = cfg();
    let quotes = Arc::new(ScriptedQuotes::new());
    let sink = Arc::new(RecordingSink::default());
    let store = FlakyStore::default();

    let extremes = ExtremumTracker::restore(
        Arc::new(store.clone()),
        cfg.retention_ms(),
        0,
        cfg.pair_label(),
    )
    .await
    .unwrap();

    let driver = Driver::new(cfg, quotes.clone(), sink.clone(), extremes);

    Harness {
        driver,
        quotes,
        sink,
        store,
    }
}

#[tokio::test]
async fn first_cycle_only_records_slots() {
    let mut h = harness().await;
    h.quotes.push_ok(60_500.0, 3_050.0).await;

    let outcome = h.driver.run_cycle(0).await.unwrap();

    assert!(outcome.primed);
    assert!(outcome.notifications.is_empty());
    assert_eq!(
        h.driver.slots(),
        Some(SlotState {
            asset_a: 60,
            asset_b: 30,
            ratio: 39,
        })
    );
}

#[tokio::test]
async fn multi_step_move_yields_one_event_per_series() {
    let mut h = harness().await;
    h.quotes.push_ok(60_500.0, 3_050.0).await;
    h.quotes.push_ok(62_100.0, 3_050.0).await;

    h.driver.run_cycle(0).await.unwrap();
    let outcome = h.driver.run_cycle(30_000).await.unwrap();

    assert_eq!(outcome.delivered, 2);
    let sent = h.sink.sent.lock().await.clone();
    assert_eq!(sent[0].title, "BTC up to $62,000");
    assert_eq!(sent[0].body, "now ≈ $62,100");
    assert_eq!(sent[1].title, "BTC/ETH up to 20.00");
}

#[tokio::test]
async fn downward_crossing_reports_upper_edge() {
    let mut h = harness().await;
    h.quotes.push_ok(60_500.0, 3_050.0).await;
    h.quotes.push_ok(60_500.0, 2_990.0).await;

    h.driver.run_cycle(0).await.unwrap();
    h.driver.run_cycle(30_000).await.unwrap();

    let titles = h.sink.titles().await;
    assert!(titles.contains(&"ETH down to $3,000".to_string()), "{titles:?}");
}

#[tokio::test]
#[traced_test]
async fn failed_fetch_keeps_previous_slots() {
    let mut h = harness().await;
    h.quotes.push_ok(60_500.0, 3_050.0).await;
    h.quotes.push_err().await;
    h.quotes.push_ok(61_200.0, 3_050.0).await;

    h.driver.run_cycle(0).await.unwrap();
    let primed = h.driver.slots();

    h.driver.tick(30_000).await;
    assert!(logs_contain("cycle failed"));
    assert_eq!(h.driver.slots(), primed);
    assert!(h.driver.extremes().history().len() == 1);

    h.driver.run_cycle(60_000).await.unwrap();
    let titles = h.sink.titles().await;
    assert!(titles.contains(&"BTC up to $61,000".to_string()), "{titles:?}");

    let snap = h.driver.counters().snapshot();
    assert_eq!(snap.cycles, 3);
    assert_eq!(snap.quote_failures, 1);
}

#[tokio::test]
async fn fetch_error_maps_to_quote_fetch() {
    let mut h = harness().await;
    h.quotes.push_err().await;

    let err = h.driver.run_cycle(0).await.unwrap_err();
    assert!(matches!(err, AppError::QuoteFetch(_)));
    assert!(h.driver.slots().is_none());
}

#[tokio::test]
async fn delivery_failure_is_counted_and_not_retried() {
    let mut h = harness().await;
    h.quotes.push_ok(60_500.0, 3_050.0).await;
    h.quotes.push_ok(62_100.0, 3_050.0).await;
    h.quotes.push_ok(63_100.0, 3_090.0).await; // ETH and ratio stay in their slots

    h.driver.run_cycle(0).await.unwrap();

    h.sink.fail.store(true, Ordering::SeqCst);
    let outcome = h.driver.run_cycle(30_000).await.unwrap();
    assert_eq!(outcome.notifications.len(), 2);
    assert_eq!(outcome.delivered, 0);

    h.sink.fail.store(false, Ordering::SeqCst);
    h.driver.run_cycle(60_000).await.unwrap();

    // only the later crossing arrives; the dropped ones are gone
    let titles = h.sink.titles().await;
    assert_eq!(titles, vec!["BTC up to $63,000".to_string()]);

    let snap = h.driver.counters().snapshot();
    assert_eq!(snap.notifications_failed, 2);
    assert_eq!(snap.notifications_sent, 1);
}

#[tokio::test]
#[traced_test]
async fn storage_failure_abandons_only_the_extremum_update() {
    let mut h = harness().await;
    h.quotes.push_ok(60_500.0, 3_050.0).await;
    h.quotes.push_ok(62_100.0, 3_050.0).await;
    h.quotes.push_ok(62_200.0, 3_050.0).await;

    h.store.fail.store(true, Ordering::SeqCst);

    let outcome = h.driver.run_cycle(0).await.unwrap();
    assert!(outcome.primed);
    let outcome = h.driver.run_cycle(30_000).await.unwrap();
    assert_eq!(outcome.delivered, 2);
    assert!(logs_contain("extremum update abandoned"));
    assert!(h.driver.extremes().history().is_empty());

    h.store.fail.store(false, Ordering::SeqCst);
    h.driver.run_cycle(60_000).await.unwrap();
    assert_eq!(h.driver.extremes().history().len(), 1);
    assert_eq!(h.store.inner.history.lock().await.len(), 1);

    assert_eq!(h.driver.counters().snapshot().storage_failures, 2);
}

#[tokio::test]
async fn extremes_are_dispatched_once_enough_history_exists() {
    let mut h = harness().await;

    for hour in 0..=25 {
        h.quotes.push_ok(60_500.0, 3_050.0).await;
        h.driver.run_cycle(hour * HOUR_MS).await.unwrap();

        let titles = h.sink.titles().await;
        if hour < 24 {
            assert!(titles.is_empty(), "hour {hour}: {titles:?}");
        }
    }

    // flat ratio is both the 24h low and the 24h high, announced once
    assert_eq!(
        h.sink.titles().await,
        vec!["BTC/ETH 24h low".to_string(), "BTC/ETH 24h high".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn run_polls_until_shutdown() {
    let h = harness().await;
    for _ in 0..10 {
        h.quotes.push_ok(60_500.0, 3_050.0).await;
    }

    let counters = h.driver.counters().clone();

    // ticks at 0s, 30s, 60s, 90s
    h.driver
        .run(tokio::time::sleep(Duration::from_secs(95)))
        .await;

    assert_eq!(counters.snapshot().cycles, 4);
}
