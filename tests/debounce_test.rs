//! デバウンスのテスト（仮想時間）

use hrms_dashboard::debounce::{Debouncer, DEFAULT_DELAY};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

/// 確定値を (開始からの経過時間, 値) で記録する
fn record(debouncer: &Debouncer<String>) -> JoinHandle<Vec<(Duration, String)>> {
    let mut rx = debouncer.subscribe();
    let start = Instant::now();
    tokio::spawn(async move {
        let mut emissions = Vec::new();
        while rx.changed().await.is_ok() {
            emissions.push((start.elapsed(), rx.borrow_and_update().clone()));
        }
        emissions
    })
}

#[tokio::test(start_paused = true)]
async fn test_rapid_updates_emit_last_value_once() {
    let mut debouncer = Debouncer::new(String::new(), DEFAULT_DELAY);
    let listener = record(&debouncer);

    debouncer.push("1".to_string());
    sleep(Duration::from_millis(100)).await;
    debouncer.push("12".to_string());
    sleep(Duration::from_millis(100)).await;
    debouncer.push("123".to_string());
    sleep(Duration::from_millis(1000)).await;

    assert_eq!(debouncer.settled(), "123");
    drop(debouncer);

    let emissions = listener.await.unwrap();
    assert_eq!(emissions.len(), 1, "emissions: {:?}", emissions);
    let (at, value) = &emissions[0];
    assert_eq!(value, "123");
    assert!(*at >= Duration::from_millis(700), "emitted too early: {:?}", at);
    assert!(*at < Duration::from_millis(750), "emitted too late: {:?}", at);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_emitted_before_delay() {
    let mut debouncer = Debouncer::new(String::new(), DEFAULT_DELAY);
    let rx = debouncer.subscribe();

    debouncer.push("a".to_string());
    assert!(debouncer.is_pending());
    sleep(Duration::from_millis(499)).await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(debouncer.settled(), "");

    sleep(Duration::from_millis(10)).await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(debouncer.settled(), "a");
    assert!(!debouncer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_spaced_updates_each_emit() {
    let mut debouncer = Debouncer::new(String::new(), Duration::from_millis(200));
    let listener = record(&debouncer);

    debouncer.push("first".to_string());
    sleep(Duration::from_millis(300)).await;
    debouncer.push("second".to_string());
    sleep(Duration::from_millis(300)).await;
    drop(debouncer);

    let values: Vec<String> = listener.await.unwrap().into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_discards_pending_value() {
    let mut debouncer = Debouncer::new("initial".to_string(), DEFAULT_DELAY);
    let rx = debouncer.subscribe();

    debouncer.push("typed".to_string());
    debouncer.cancel();
    sleep(Duration::from_secs(2)).await;

    assert!(!rx.has_changed().unwrap());
    assert_eq!(debouncer.settled(), "initial");
}

#[tokio::test(start_paused = true)]
async fn test_drop_discards_pending_value() {
    let mut debouncer = Debouncer::new(String::new(), DEFAULT_DELAY);
    let listener = record(&debouncer);

    debouncer.push("typed".to_string());
    sleep(Duration::from_millis(100)).await;
    drop(debouncer);
    sleep(Duration::from_secs(2)).await;

    assert!(listener.await.unwrap().is_empty());
}
