//! トランザクションステータス定義
//!
//! GEMS / GPF それぞれ固定のステータス集合を持つ。
//! 宣言順がカード・集計の表示順になる。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// ダッシュボードのステータス列挙が満たすべき性質
pub trait TransactionStatus:
    Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static + IntoEnumIterator + AsRef<str> + FromStr
{
    /// 画面表示用ラベル
    fn label(&self) -> &'static str;

    /// APIで使うステータス名（例: "HRMS_RECEIVED"）
    fn wire_name(&self) -> &str {
        self.as_ref()
    }

    /// 宣言順の全ステータス
    fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// 大文字小文字を無視してパース
    fn parse_status(input: &str) -> Result<Self> {
        let normalized = input.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        normalized
            .parse::<Self>()
            .map_err(|_| Error::UnknownStatus(input.to_string()))
    }
}

/// GEMSのステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, EnumIter, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GemsStatus {
    JsonSent,
    PdfSent,
    HrmsReceived,
    HrmsRejected,
    DdoReceived,
    DdoRejected,
}

impl TransactionStatus for GemsStatus {
    fn label(&self) -> &'static str {
        match self {
            GemsStatus::JsonSent => "JSON Sent",
            GemsStatus::PdfSent => "PDF Sent",
            GemsStatus::HrmsReceived => "HRMS Received",
            GemsStatus::HrmsRejected => "HRMS Rejection",
            GemsStatus::DdoReceived => "DDO Received",
            GemsStatus::DdoRejected => "DDO Rejected",
        }
    }
}

/// GPFのステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, EnumIter, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GpfStatus {
    JsonSent,
    HrmsReceived,
    HrmsRejected,
}

impl TransactionStatus for GpfStatus {
    fn label(&self) -> &'static str {
        match self {
            GpfStatus::JsonSent => "JSON Sent",
            GpfStatus::HrmsReceived => "HRMS Acceptance",
            GpfStatus::HrmsRejected => "HRMS Rejection",
        }
    }
}
