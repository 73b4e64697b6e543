//! トランザクション取得の調停
//!
//! 集計トラックと一覧トラックは独立して動く。
//! - フィルタ変更: 両方を再取得
//! - ステータス選択: 一覧だけ再取得（集計はフィルタのみに依存）
//! - ページ変更: 取得済み一覧を切り出すだけ
//!
//! 一覧を再取得するたびにページは1に戻す。

mod track;

pub use track::{Phase, Ticket, Track};

use crate::api::TransactionSource;
use crate::error::{DashboardError, Result};
use hrms_dashboard_common::{paginate, to_csv, Dashboard, FilterSet, StatCounts};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// ダッシュボードの表示状態
pub struct DashboardSnapshot<D: Dashboard> {
    pub filters: FilterSet,
    pub status: Option<D::Status>,
    pub stats: StatCounts<D::Status>,
    pub stats_track: Track,
    pub records: Vec<D::Record>,
    pub table_track: Track,
    /// 1始まり
    pub page: usize,
}

impl<D: Dashboard> DashboardSnapshot<D> {
    fn new() -> Self {
        Self {
            filters: FilterSet::new(),
            status: None,
            stats: StatCounts::zeroed(),
            stats_track: Track::default(),
            records: Vec::new(),
            table_track: Track::default(),
            page: 1,
        }
    }
}

impl<D: Dashboard> Clone for DashboardSnapshot<D> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            status: self.status,
            stats: self.stats.clone(),
            stats_track: self.stats_track.clone(),
            records: self.records.clone(),
            table_track: self.table_track.clone(),
            page: self.page,
        }
    }
}

/// 表示中ページ（所有版）
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<R> {
    pub rows: Vec<R>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub first_index: usize,
}

pub struct QueryCoordinator<D: Dashboard> {
    source: Arc<dyn TransactionSource<D>>,
    state: Arc<Mutex<DashboardSnapshot<D>>>,
    revision: Arc<watch::Sender<u64>>,
    page_size: usize,
}

impl<D: Dashboard> Clone for QueryCoordinator<D> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            revision: Arc::clone(&self.revision),
            page_size: self.page_size,
        }
    }
}

impl<D: Dashboard> QueryCoordinator<D> {
    pub fn new(source: Arc<dyn TransactionSource<D>>, page_size: usize) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            source,
            state: Arc::new(Mutex::new(DashboardSnapshot::new())),
            revision: Arc::new(revision),
            page_size: page_size.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardSnapshot<D>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// 状態が変わるたびに番号が進む
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn snapshot(&self) -> DashboardSnapshot<D> {
        self.lock().clone()
    }

    /// 集計を再取得する
    ///
    /// チケットは呼び出した時点で発行される。返されたFutureを待つと結果が反映される。
    pub fn refresh_stats(&self) -> impl Future<Output = ()> + Send + 'static {
        let (ticket, filters) = {
            let mut state = self.lock();
            (state.stats_track.begin(), state.filters.clone())
        };
        self.publish();

        let this = self.clone();
        async move {
            let fetched = this.source.fetch_stats(&filters).await;
            let committed = {
                let mut state = this.lock();
                let current = state.stats_track.finish(ticket, fetched.failed);
                if current {
                    state.stats = fetched.data;
                }
                current
            };

            if committed {
                this.publish();
            } else {
                debug!("{} 集計: 古い結果を破棄 (#{})", D::NAME, ticket.number());
            }
        }
    }

    /// 一覧を再取得する（ページは1に戻る）
    pub fn refresh_table(&self) -> impl Future<Output = ()> + Send + 'static {
        let (ticket, status, filters) = {
            let mut state = self.lock();
            state.page = 1;
            (state.table_track.begin(), state.status, state.filters.clone())
        };
        self.publish();

        let this = self.clone();
        async move {
            let fetched = this.source.fetch_transactions(status, &filters).await;
            let committed = {
                let mut state = this.lock();
                let current = state.table_track.finish(ticket, fetched.failed);
                if current {
                    state.records = fetched.data;
                }
                current
            };

            if committed {
                this.publish();
            } else {
                debug!("{} 一覧: 古い結果を破棄 (#{})", D::NAME, ticket.number());
            }
        }
    }

    /// 初回表示（集計と一覧を並行取得）
    pub fn mount(&self) -> impl Future<Output = ()> + Send + 'static {
        let stats = self.refresh_stats();
        let table = self.refresh_table();
        async move {
            futures::join!(stats, table);
        }
    }

    /// 確定したフィルタを適用して両トラックを再取得
    pub fn apply_filters(&self, filters: FilterSet) -> impl Future<Output = ()> + Send + 'static {
        self.lock().filters = filters;
        self.mount()
    }

    /// 取得せずにフィルタとステータスを差し替える（続けて `mount()` する）
    pub fn preset(&self, filters: FilterSet, status: Option<D::Status>) {
        let mut state = self.lock();
        state.filters = filters;
        state.status = status;
    }

    /// ステータス選択（同じステータスをもう一度選ぶと解除）
    pub fn select_status(&self, status: D::Status) -> impl Future<Output = ()> + Send + 'static {
        {
            let mut state = self.lock();
            state.status = if state.status == Some(status) {
                None
            } else {
                Some(status)
            };
        }
        self.refresh_table()
    }

    /// ステータス選択を解除（未選択なら何もしない）
    pub fn clear_status(&self) -> Option<impl Future<Output = ()> + Send + 'static> {
        let current = self.lock().status;
        current.map(|status| self.select_status(status))
    }

    /// ページ移動。範囲外は丸める。取得はしない
    pub fn set_page(&self, page: usize) -> usize {
        let number = {
            let mut state = self.lock();
            let number = paginate(&state.records, page, self.page_size).number;
            state.page = number;
            number
        };
        self.publish();
        number
    }

    pub fn page(&self) -> PageView<D::Record> {
        let state = self.lock();
        let page = paginate(&state.records, state.page, self.page_size);
        PageView {
            rows: page.items.to_vec(),
            number: page.number,
            total_pages: page.total_pages,
            total_items: page.total_items,
            first_index: page.first_index,
        }
    }

    /// 取得済み一覧（表示中ページだけでなく全件）をCSVに書き出す
    pub fn export_csv(&self, dir: &Path) -> Result<PathBuf> {
        let csv = {
            let state = self.lock();
            to_csv(&state.records)?
        };
        let csv = csv.ok_or(DashboardError::NothingToExport)?;

        std::fs::create_dir_all(dir)?;
        let path = dir.join(D::EXPORT_FILE_NAME);
        std::fs::write(&path, csv)?;
        info!("{} CSV出力: {}", D::NAME, path.display());
        Ok(path)
    }

    /// デバウンス済みフィルタに追従する
    ///
    /// 現在値で初回取得し、以降は値が変わるたびに再取得する。送信側が閉じたら終了。
    pub fn follow(&self, mut filters: watch::Receiver<FilterSet>) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let initial = filters.borrow_and_update().clone();
            tokio::spawn(this.apply_filters(initial));

            while filters.changed().await.is_ok() {
                let next = filters.borrow_and_update().clone();
                if next == this.lock().filters {
                    continue;
                }
                debug!("{} フィルタ変更: {:?}", D::NAME, next.to_query());
                tokio::spawn(this.apply_filters(next));
            }
        })
    }
}
