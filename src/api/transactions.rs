//! 集計・一覧の取得
//!
//! 呼び出し側には例外を返さない。失敗時はログを出し、
//! 0件の集計・空の一覧を `failed` 付きで返す。

use super::client::ApiClient;
use async_trait::async_trait;
use hrms_dashboard_common::{Dashboard, FilterSet, StatCounts, StatsResponse, TransactionStatus};
use tracing::error;

/// 取得結果（失敗時はフォールバック値）
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub failed: bool,
}

impl<T> Fetched<T> {
    pub fn ok(data: T) -> Self {
        Self { data, failed: false }
    }

    pub fn fallback(data: T) -> Self {
        Self { data, failed: true }
    }
}

/// ダッシュボードのデータ取得元
#[async_trait]
pub trait TransactionSource<D: Dashboard>: Send + Sync {
    async fn fetch_stats(&self, filters: &FilterSet) -> Fetched<StatCounts<D::Status>>;

    /// status が None なら全ステータス
    async fn fetch_transactions(
        &self,
        status: Option<D::Status>,
        filters: &FilterSet,
    ) -> Fetched<Vec<D::Record>>;
}

/// 一覧APIのクエリ（ステータス未選択なら status を送らない）
pub fn transactions_query<S: TransactionStatus>(status: Option<S>, filters: &FilterSet) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(status) = status {
        query.push(("status".to_string(), status.wire_name().to_string()));
    }
    query.extend(filters.to_query());
    query
}

#[async_trait]
impl<D: Dashboard> TransactionSource<D> for ApiClient {
    async fn fetch_stats(&self, filters: &FilterSet) -> Fetched<StatCounts<D::Status>> {
        match self.get_json::<StatsResponse>(D::STATS_PATH, &filters.to_query()).await {
            Ok(response) => Fetched::ok(StatCounts::from_response(&response)),
            Err(e) => {
                error!("{} の集計取得に失敗: {}", D::NAME, e);
                Fetched::fallback(StatCounts::zeroed())
            }
        }
    }

    async fn fetch_transactions(
        &self,
        status: Option<D::Status>,
        filters: &FilterSet,
    ) -> Fetched<Vec<D::Record>> {
        let query = transactions_query(status, filters);
        match self.get_json::<Vec<D::Record>>(D::TRANSACTIONS_PATH, &query).await {
            Ok(records) => Fetched::ok(records),
            Err(e) => {
                error!("{} のトランザクション取得に失敗: {}", D::NAME, e);
                Fetched::fallback(Vec::new())
            }
        }
    }
}
