//! ダッシュボード定義
//!
//! GEMS / GPF の違い（ステータス集合・フィルタ項目・レコード形・エンドポイント）を
//! 型パラメータとしてまとめ、取得処理側は1つの実装で両方を扱う。

use crate::export::CsvRecord;
use crate::status::{GemsStatus, GpfStatus, TransactionStatus};
use crate::types::{GemsTransaction, GpfTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

pub trait Dashboard: Send + Sync + 'static {
    type Status: TransactionStatus;
    type Record: CsvRecord + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// 表示名（ログ・画面見出し用）
    const NAME: &'static str;
    /// 画面のパス
    const PAGE_PATH: &'static str;
    const STATS_PATH: &'static str;
    const TRANSACTIONS_PATH: &'static str;
    /// APIのクエリパラメータ名
    const FILTER_FIELDS: &'static [&'static str];
    const EXPORT_FILE_NAME: &'static str;

    fn accepts_filter(field: &str) -> bool {
        Self::FILTER_FIELDS.contains(&field)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Gems;

impl Dashboard for Gems {
    type Status = GemsStatus;
    type Record = GemsTransaction;

    const NAME: &'static str = "GEMS";
    const PAGE_PATH: &'static str = "/gems";
    const STATS_PATH: &'static str = "/gems/stats";
    const TRANSACTIONS_PATH: &'static str = "/gems/transactions";
    const FILTER_FIELDS: &'static [&'static str] = &["geNumber", "eventName", "fromDate", "toDate"];
    const EXPORT_FILE_NAME: &'static str = "gems_transactions.csv";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Gpf;

impl Dashboard for Gpf {
    type Status = GpfStatus;
    type Record = GpfTransaction;

    const NAME: &'static str = "GPF";
    const PAGE_PATH: &'static str = "/gpf";
    const STATS_PATH: &'static str = "/gpf/stats";
    const TRANSACTIONS_PATH: &'static str = "/gpf/transactions";
    const FILTER_FIELDS: &'static [&'static str] = &["kgid", "fromDate", "toDate"];
    const EXPORT_FILE_NAME: &'static str = "gpf_transactions.csv";
}
