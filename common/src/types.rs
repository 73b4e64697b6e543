//! APIとやり取りする型定義
//!
//! - User / AuthResponse: 認証API（/auth/login, /auth/signup）
//! - StatsResponse / StatCounts: ステータス集計（/gems/stats, /gpf/stats）
//! - GemsTransaction / GpfTransaction: トランザクション一覧

use crate::error::Result;
use crate::status::TransactionStatus;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// ログインユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: String,
}

impl User {
    /// 永続化用のJSON文字列
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// ログイン・サインアップのリクエストボディ
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// 認証APIレスポンス
///
/// トークンとユーザーの両方が揃った場合のみ成功として扱う
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthResponse {
    /// (token, user) が揃っていれば取り出す
    pub fn into_session(self) -> Option<(String, User)> {
        match (self.token, self.user) {
            (Some(token), Some(user)) if !token.is_empty() => Some((token, user)),
            _ => None,
        }
    }
}

/// 集計APIのレスポンス（ワイヤ形式）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsResponse {
    pub status_counts: HashMap<String, u64>,
    pub total_transactions: u64,
}

/// ステータス別件数と合計
///
/// ステータス列挙の宣言順で並ぶ。レスポンスに無いステータスは0件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCounts<S: TransactionStatus> {
    counts: Vec<(S, u64)>,
    total: u64,
}

impl<S: TransactionStatus> StatCounts<S> {
    /// 全ステータス0件（取得失敗時のフォールバック）
    pub fn zeroed() -> Self {
        Self {
            counts: S::iter().map(|s| (s, 0)).collect(),
            total: 0,
        }
    }

    pub fn from_response(response: &StatsResponse) -> Self {
        let counts = S::iter()
            .map(|s| {
                let count = response
                    .status_counts
                    .get(s.wire_name())
                    .copied()
                    .unwrap_or(0);
                (s, count)
            })
            .collect();

        Self {
            counts,
            total: response.total_transactions,
        }
    }

    pub fn get(&self, status: S) -> u64 {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (S, u64)> + '_ {
        self.counts.iter().copied()
    }

    /// 円グラフ用の構成比（%）。全件0なら0.0
    pub fn share(&self, status: S) -> f64 {
        let sum: u64 = self.counts.iter().map(|(_, c)| c).sum();
        if sum == 0 {
            return 0.0;
        }
        self.get(status) as f64 * 100.0 / sum as f64
    }
}

impl<S: TransactionStatus> Default for StatCounts<S> {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// null・数値・文字列のいずれも受け付けて文字列に寄せる
fn nullable_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// GEMSトランザクション
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GemsTransaction {
    #[serde(default, deserialize_with = "nullable_text")]
    pub transaction_id: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub ge_number: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub event_id: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub event_name: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub file_id: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub pdf_file_name: Option<String>,

    #[serde(rename = "JSONSENTDATE", default, deserialize_with = "nullable_text")]
    pub json_sent_date: Option<String>,
}

/// GPFトランザクション
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GpfTransaction {
    #[serde(default, deserialize_with = "nullable_text")]
    pub transaction_id: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub gpf_id: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub kgid: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub date_of_birth: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub joining_date: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub policy_no: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub policy_start_date: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub json_sent_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{GemsStatus, GpfStatus};
    use serde_json::json;

    #[test]
    fn test_user_json_round_trip() {
        let user = User { username: "alice".to_string(), role: "admin".to_string() };
        let raw = user.to_json().unwrap();
        assert_eq!(User::from_json(&raw).unwrap(), user);
        assert!(User::from_json("{not json").is_err());
    }

    #[test]
    fn test_auth_response_requires_token_and_user() {
        let ok: AuthResponse = serde_json::from_value(json!({
            "token": "abc",
            "user": { "username": "alice", "role": "admin" }
        }))
        .unwrap();
        let (token, user) = ok.into_session().unwrap();
        assert_eq!(token, "abc");
        assert_eq!(user.role, "admin");

        let no_user: AuthResponse = serde_json::from_value(json!({ "token": "abc" })).unwrap();
        assert!(no_user.into_session().is_none());

        let empty_token: AuthResponse = serde_json::from_value(json!({
            "token": "",
            "user": { "username": "alice", "role": "admin" }
        }))
        .unwrap();
        assert!(empty_token.into_session().is_none());
    }

    #[test]
    fn test_stat_counts_from_response() {
        let response: StatsResponse = serde_json::from_value(json!({
            "statusCounts": { "JSON_SENT": 7, "HRMS_REJECTED": 2, "SOMETHING_ELSE": 99 },
            "totalTransactions": 9
        }))
        .unwrap();

        let counts = StatCounts::<GpfStatus>::from_response(&response);
        assert_eq!(counts.get(GpfStatus::JsonSent), 7);
        assert_eq!(counts.get(GpfStatus::HrmsReceived), 0);
        assert_eq!(counts.get(GpfStatus::HrmsRejected), 2);
        assert_eq!(counts.total(), 9);

        let order: Vec<_> = counts.iter().map(|(s, _)| s).collect();
        assert_eq!(order, GpfStatus::all());
    }

    #[test]
    fn test_stats_response_missing_fields() {
        let response: StatsResponse = serde_json::from_value(json!({})).unwrap();
        let counts = StatCounts::<GemsStatus>::from_response(&response);
        assert_eq!(counts, StatCounts::zeroed());
    }

    #[test]
    fn test_share() {
        let response: StatsResponse = serde_json::from_value(json!({
            "statusCounts": { "JSON_SENT": 1, "HRMS_RECEIVED": 3 },
            "totalTransactions": 4
        }))
        .unwrap();
        let counts = StatCounts::<GpfStatus>::from_response(&response);
        assert!((counts.share(GpfStatus::HrmsReceived) - 75.0).abs() < f64::EPSILON);
        assert_eq!(StatCounts::<GpfStatus>::zeroed().share(GpfStatus::JsonSent), 0.0);
    }

    #[test]
    fn test_gems_transaction_field_names() {
        let tx: GemsTransaction = serde_json::from_value(json!({
            "TRANSACTION_ID": 1001,
            "GE_NUMBER": "GE-1",
            "EVENT_ID": "E9",
            "EVENT_NAME": "Promotion",
            "FILE_ID": null,
            "PDF_FILE_NAME": "order.pdf",
            "JSONSENTDATE": "2024-01-02"
        }))
        .unwrap();

        assert_eq!(tx.transaction_id.as_deref(), Some("1001"));
        assert_eq!(tx.file_id, None);
        assert_eq!(tx.json_sent_date.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_gpf_transaction_missing_fields_are_null() {
        let tx: GpfTransaction = serde_json::from_value(json!({
            "KGID": "12345",
            "NAME": "Ravi"
        }))
        .unwrap();

        assert_eq!(tx.kgid.as_deref(), Some("12345"));
        assert_eq!(tx.policy_no, None);
        assert_eq!(tx.json_sent_date, None);
    }
}
