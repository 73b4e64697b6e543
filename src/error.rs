use hrms_dashboard_common::FormErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ログインしていません。`hrms-dashboard login` でログインしてください")]
    NotAuthenticated,

    #[error("既に {0} としてログインしています。切り替えるには先に `hrms-dashboard logout` を実行してください")]
    AlreadyAuthenticated(String),

    #[error("認証が拒否されました (HTTP {0})。再度ログインしてください")]
    Unauthorized(u16),

    #[error("{0}")]
    AuthFailed(String),

    #[error("入力エラー: {0}")]
    Validation(FormErrors),

    #[error("API呼び出しエラー: HTTP {status} ({path})")]
    Http { status: u16, path: String },

    #[error("通信エラー: {0}")]
    Request(#[from] reqwest::Error),

    #[error("APIレスポンスのパースに失敗: {0}")]
    Decode(String),

    #[error("ダウンロードするデータがありません")]
    NothingToExport,

    #[error("CSV出力エラー: {0}")]
    Csv(String),

    #[error("不明なステータス: {0}")]
    UnknownStatus(String),

    #[error("入力の読み取りに失敗: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// 利用者への警告として扱うもの（システムエラーとしてログしない）
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            DashboardError::NothingToExport
                | DashboardError::Validation(_)
                | DashboardError::AlreadyAuthenticated(_)
        )
    }
}

impl From<hrms_dashboard_common::Error> for DashboardError {
    fn from(err: hrms_dashboard_common::Error) -> Self {
        match err {
            hrms_dashboard_common::Error::Json(e) => DashboardError::JsonParse(e),
            hrms_dashboard_common::Error::UnknownStatus(s) => DashboardError::UnknownStatus(s),
            e @ (hrms_dashboard_common::Error::Csv(_) | hrms_dashboard_common::Error::Encoding(_)) => {
                DashboardError::Csv(e.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
