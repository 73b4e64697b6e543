//! 取得調停のテスト
//!
//! 応答順を制御できる偽の取得元を使い、古い結果の破棄・トラックの独立性・
//! ステータス切り替え・ページングを検証

use async_trait::async_trait;
use hrms_dashboard::api::{transactions_query, Fetched, TransactionSource};
use hrms_dashboard::coordinator::{Phase, QueryCoordinator};
use hrms_dashboard::error::DashboardError;
use hrms_dashboard_common::{
    Dashboard, FilterSet, Gpf, GpfStatus, GpfTransaction, StatCounts, StatsResponse,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tokio::sync::{oneshot, watch};

/// kgidごとに決まった応答を返す取得元
///
/// `gate("stats:1")` のように登録したキーの取得は、送信側が発火するまで止まる。
#[derive(Default)]
struct GatedSource {
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl GatedSource {
    fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn pass(&self, kind: &str, query: &[(String, String)], kgid: &str) {
        let line = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        self.calls.lock().unwrap().push(format!("{}?{}", kind, line));

        let gate = self.gates.lock().unwrap().remove(&format!("{}:{}", kind, kgid));
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

/// kgid n → 5n件、kgid未指定 → 25件
fn row_count(kgid: &str) -> usize {
    kgid.parse::<usize>().map(|n| n * 5).unwrap_or(25)
}

fn rows(kgid: &str) -> Vec<GpfTransaction> {
    (0..row_count(kgid))
        .map(|i| GpfTransaction {
            transaction_id: Some(format!("T{}", i + 1)),
            kgid: Some(kgid.to_string()),
            ..Default::default()
        })
        .collect()
}

#[async_trait]
impl TransactionSource<Gpf> for GatedSource {
    async fn fetch_stats(&self, filters: &FilterSet) -> Fetched<StatCounts<GpfStatus>> {
        let kgid = filters.get("kgid").unwrap_or("").to_string();
        self.pass("stats", &filters.to_query(), &kgid).await;

        if self.fail.load(Ordering::SeqCst) {
            return Fetched::fallback(StatCounts::zeroed());
        }
        let n = row_count(&kgid) as u64;
        let response = StatsResponse {
            status_counts: HashMap::from([("HRMS_RECEIVED".to_string(), n)]),
            total_transactions: n,
        };
        Fetched::ok(StatCounts::from_response(&response))
    }

    async fn fetch_transactions(
        &self,
        status: Option<GpfStatus>,
        filters: &FilterSet,
    ) -> Fetched<Vec<GpfTransaction>> {
        let kgid = filters.get("kgid").unwrap_or("").to_string();
        self.pass("table", &transactions_query(status, filters), &kgid).await;

        if self.fail.load(Ordering::SeqCst) {
            return Fetched::fallback(Vec::new());
        }
        Fetched::ok(rows(&kgid))
    }
}

fn setup() -> (Arc<GatedSource>, QueryCoordinator<Gpf>) {
    let source = Arc::new(GatedSource::default());
    let coordinator = QueryCoordinator::<Gpf>::new(source.clone(), 10);
    (source, coordinator)
}

fn kgid(value: &str) -> FilterSet {
    FilterSet::new().with("kgid", value)
}

/// 条件が満たされるまで他のタスクに譲る
async fn until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_mount_fetches_both_tracks() {
    let (source, coordinator) = setup();
    assert_eq!(coordinator.snapshot().stats_track.phase(), Phase::Idle);

    coordinator.mount().await;

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.stats_track.phase(), Phase::Ready);
    assert_eq!(snapshot.table_track.phase(), Phase::Ready);
    assert_eq!(snapshot.stats.get(GpfStatus::HrmsReceived), 25);
    assert_eq!(snapshot.records.len(), 25);
    assert_eq!(source.calls(), vec!["stats?".to_string(), "table?".to_string()]);
}

#[tokio::test]
async fn test_stale_results_are_discarded() {
    let (source, coordinator) = setup();
    let stats_1 = source.gate("stats:1");
    let table_1 = source.gate("table:1");

    let first = tokio::spawn(coordinator.apply_filters(kgid("1")));
    let second = tokio::spawn(coordinator.apply_filters(kgid("2")));
    second.await.unwrap();

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.records.len(), 10);
    assert_eq!(snapshot.stats.get(GpfStatus::HrmsReceived), 10);
    assert!(!snapshot.stats_track.is_loading());
    assert!(!snapshot.table_track.is_loading());

    // 遅れて届いたkgid=1の結果は反映されない
    stats_1.send(()).unwrap();
    table_1.send(()).unwrap();
    first.await.unwrap();

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.filters, kgid("2"));
    assert_eq!(snapshot.records.len(), 10);
    assert!(snapshot.records.iter().all(|r| r.kgid.as_deref() == Some("2")));
    assert_eq!(snapshot.stats.get(GpfStatus::HrmsReceived), 10);
}

#[tokio::test]
async fn test_tracks_load_independently() {
    let (source, coordinator) = setup();
    let stats_gate = source.gate("stats:");

    let mount = tokio::spawn(coordinator.mount());
    until(|| !coordinator.snapshot().table_track.is_loading()).await;

    let snapshot = coordinator.snapshot();
    assert!(snapshot.stats_track.is_loading());
    assert_eq!(snapshot.records.len(), 25);

    stats_gate.send(()).unwrap();
    mount.await.unwrap();
    assert!(!coordinator.snapshot().stats_track.is_loading());
}

#[tokio::test]
async fn test_status_toggle_refetches_table_only() {
    let (source, coordinator) = setup();
    coordinator.mount().await;
    source.clear_calls();

    coordinator.select_status(GpfStatus::HrmsReceived).await;
    assert_eq!(coordinator.snapshot().status, Some(GpfStatus::HrmsReceived));

    coordinator.select_status(GpfStatus::HrmsReceived).await;
    assert_eq!(coordinator.snapshot().status, None);

    assert_eq!(
        source.calls(),
        vec!["table?status=HRMS_RECEIVED".to_string(), "table?".to_string()]
    );
}

#[tokio::test]
async fn test_clear_status() {
    let (source, coordinator) = setup();
    assert!(coordinator.clear_status().is_none());

    coordinator.select_status(GpfStatus::JsonSent).await;
    source.clear_calls();

    coordinator.clear_status().expect("status selected").await;
    assert_eq!(coordinator.snapshot().status, None);
    assert_eq!(source.calls(), vec!["table?".to_string()]);
}

#[tokio::test]
async fn test_status_and_filters_are_sent_together() {
    let (source, coordinator) = setup();
    coordinator.apply_filters(kgid("3").with("fromDate", "")).await;
    source.clear_calls();

    coordinator.select_status(GpfStatus::HrmsRejected).await;
    assert_eq!(source.calls(), vec!["table?status=HRMS_REJECTED&kgid=3".to_string()]);
}

#[tokio::test]
async fn test_pagination_clamps_and_resets() {
    let (_source, coordinator) = setup();
    coordinator.mount().await;

    let page = coordinator.page();
    assert_eq!(page.number, 1);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.rows.len(), 10);

    assert_eq!(coordinator.set_page(3), 3);
    let page = coordinator.page();
    assert_eq!(page.rows.len(), 5);
    assert_eq!(page.first_index, 21);
    assert_eq!(page.rows[0].transaction_id.as_deref(), Some("T21"));

    assert_eq!(coordinator.set_page(99), 3);
    assert_eq!(coordinator.set_page(0), 1);

    // 一覧を再取得したらページは1に戻る
    coordinator.set_page(2);
    coordinator.select_status(GpfStatus::JsonSent).await;
    assert_eq!(coordinator.page().number, 1);

    coordinator.set_page(2);
    coordinator.apply_filters(FilterSet::new()).await;
    assert_eq!(coordinator.page().number, 1);
}

#[tokio::test]
async fn test_failed_fetch_shows_fallback() {
    let (source, coordinator) = setup();
    source.fail.store(true, Ordering::SeqCst);

    coordinator.mount().await;

    let snapshot = coordinator.snapshot();
    assert!(snapshot.stats_track.failed());
    assert!(snapshot.table_track.failed());
    assert_eq!(snapshot.stats.total(), 0);
    assert!(snapshot.stats.iter().all(|(_, count)| count == 0));
    assert!(snapshot.records.is_empty());
    assert_eq!(coordinator.page().total_pages, 0);

    source.fail.store(false, Ordering::SeqCst);
    coordinator.mount().await;
    assert!(!coordinator.snapshot().table_track.failed());
}

#[tokio::test]
async fn test_export_csv() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (source, coordinator) = setup();

    let err = coordinator.export_csv(dir.path()).unwrap_err();
    assert!(matches!(err, DashboardError::NothingToExport));
    assert!(err.is_warning());
    assert!(!dir.path().join(Gpf::EXPORT_FILE_NAME).exists());

    coordinator.mount().await;
    coordinator.set_page(2);
    let path = coordinator.export_csv(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("gpf_transactions.csv"));

    // 表示中ページではなく全件
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 26);
    assert!(lines[0].starts_with("TRANSACTION_ID,GPF_ID,KGID"));
    assert_eq!(lines[1], r#""T1","","","","","","","","""#);
    drop(source);
}

#[tokio::test]
async fn test_revision_advances_on_changes() {
    let (_source, coordinator) = setup();
    let mut revisions = coordinator.subscribe();

    coordinator.mount().await;
    assert!(revisions.has_changed().unwrap());
    let after_mount = *revisions.borrow_and_update();

    coordinator.set_page(2);
    assert!(*revisions.borrow_and_update() > after_mount);
}

#[tokio::test]
async fn test_follow_applies_settled_filters() {
    let (source, coordinator) = setup();
    let (tx, rx) = watch::channel(FilterSet::new());

    let follower = coordinator.follow(rx);
    until(|| source.calls().len() == 2).await;
    until(|| !coordinator.snapshot().table_track.is_loading()).await;

    tx.send(kgid("2")).unwrap();
    until(|| source.calls().len() == 4).await;
    until(|| coordinator.snapshot().records.len() == 10).await;
    assert!(source.calls().contains(&"stats?kgid=2".to_string()));

    // 同じ値なら再取得しない
    tx.send(kgid("2")).unwrap();
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert_eq!(source.calls().len(), 4);

    drop(tx);
    follower.await.unwrap();
}
