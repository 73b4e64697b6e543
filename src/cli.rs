use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hrms_dashboard_common::{FilterSet, GemsFilters, GpfFilters};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hrms-dashboard")]
#[command(about = "GEMS/GPF トランザクション監視ダッシュボード", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ログイン
    Login {
        /// ユーザー名（省略時は入力を求める）
        #[arg(short, long)]
        username: Option<String>,
    },

    /// アカウント作成
    Signup {
        /// ユーザー名（省略時は入力を求める）
        #[arg(short, long)]
        username: Option<String>,
    },

    /// ログアウト（保存済みセッションを削除）
    Logout,

    /// ログイン中のユーザーを表示
    Whoami,

    /// GEMSダッシュボード
    Gems {
        #[command(subcommand)]
        action: DashboardAction,

        #[command(flatten)]
        filters: GemsFilterArgs,
    },

    /// GPFダッシュボード
    Gpf {
        #[command(subcommand)]
        action: DashboardAction,

        #[command(flatten)]
        filters: GpfFilterArgs,
    },

    /// 設定を表示/編集
    Config {
        /// APIのベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum DashboardAction {
    /// ステータス別の件数を表示
    Stats,

    /// トランザクション一覧を表示
    List {
        /// ステータスで絞り込み（例: HRMS_RECEIVED）
        #[arg(short, long)]
        status: Option<String>,

        /// ページ番号（1始まり）
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// 一覧をCSVに出力
    Export {
        /// ステータスで絞り込み
        #[arg(short, long)]
        status: Option<String>,

        /// 出力ディレクトリ（省略時は設定値またはカレント）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 対話モードで閲覧
    Browse,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GemsFilterArgs {
    /// GE番号
    #[arg(long, global = true)]
    pub ge_number: Option<String>,

    /// イベント名
    #[arg(long, global = true)]
    pub event_name: Option<String>,

    /// 開始日 (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date)]
    pub from_date: Option<String>,

    /// 終了日 (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date)]
    pub to_date: Option<String>,
}

impl From<&GemsFilterArgs> for FilterSet {
    fn from(args: &GemsFilterArgs) -> Self {
        let filters = GemsFilters {
            ge_number: args.ge_number.clone().unwrap_or_default(),
            event_name: args.event_name.clone().unwrap_or_default(),
            from_date: args.from_date.clone().unwrap_or_default(),
            to_date: args.to_date.clone().unwrap_or_default(),
        };
        FilterSet::from(&filters)
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct GpfFilterArgs {
    /// KGID
    #[arg(long, global = true)]
    pub kgid: Option<String>,

    /// 開始日 (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date)]
    pub from_date: Option<String>,

    /// 終了日 (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date)]
    pub to_date: Option<String>,
}

impl From<&GpfFilterArgs> for FilterSet {
    fn from(args: &GpfFilterArgs) -> Self {
        let filters = GpfFilters {
            kgid: args.kgid.clone().unwrap_or_default(),
            from_date: args.from_date.clone().unwrap_or_default(),
            to_date: args.to_date.clone().unwrap_or_default(),
        };
        FilterSet::from(&filters)
    }
}

/// 日付はAPIにそのまま渡すので形式だけ確認する
fn parse_date(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Ok(String::new());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|_| s.to_string())
        .map_err(|_| format!("日付は YYYY-MM-DD 形式で指定してください: {}", s))
}
