//! 対話コンソール（ダッシュボード画面の代わり）
//!
//! 標準入力からコマンドを読み、フィルタはデバウンスを通して取得処理に渡す。
//! 認証エラーで /login に飛ばされたら終了する。

use crate::coordinator::{DashboardSnapshot, PageView, QueryCoordinator};
use crate::debounce::Debouncer;
use crate::error::{DashboardError, Result};
use crate::router::{Navigator, Route};
use hrms_dashboard_common::{CsvRecord, Dashboard, FilterSet, TransactionStatus};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
コマンド:
  set <field> <value>   フィルタを設定
  clear <field>         フィルタを解除
  status <NAME|none>    ステータスを選択（同じものを再選択で解除）
  page <n>              ページ移動
  export [dir]          取得済み一覧をCSV出力
  show                  現在の状態を表示
  help                  このヘルプ
  quit                  終了";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Set { field: String, value: String },
    Clear { field: String },
    Status(Option<String>),
    Page(usize),
    Export(Option<PathBuf>),
    Show,
    Help,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> std::result::Result<ConsoleCommand, String> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head.to_ascii_lowercase().as_str() {
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "使い方: set <field> <value>".to_string())?;
                Ok(ConsoleCommand::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                })
            }
            "clear" if !rest.is_empty() => Ok(ConsoleCommand::Clear {
                field: rest.to_string(),
            }),
            "status" if rest.eq_ignore_ascii_case("none") => Ok(ConsoleCommand::Status(None)),
            "status" if !rest.is_empty() => Ok(ConsoleCommand::Status(Some(rest.to_string()))),
            "page" => rest
                .parse::<usize>()
                .map(ConsoleCommand::Page)
                .map_err(|_| "使い方: page <n>".to_string()),
            "export" if rest.is_empty() => Ok(ConsoleCommand::Export(None)),
            "export" => Ok(ConsoleCommand::Export(Some(PathBuf::from(rest)))),
            "show" => Ok(ConsoleCommand::Show),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            "" => Err(String::new()),
            _ => Err(format!("不明なコマンド: {}（help で一覧）", line)),
        }
    }
}

/// 集計カード + 表示中ページを文字列にする
pub fn render<D: Dashboard>(snapshot: &DashboardSnapshot<D>, page: &PageView<D::Record>) -> String {
    let mut out = String::new();

    out.push_str(&format!("== {} ==\n", D::NAME));
    if snapshot.stats_track.is_loading() {
        out.push_str("集計: 読み込み中...\n");
    } else {
        for (status, count) in snapshot.stats.iter() {
            let marker = if snapshot.status == Some(status) { "*" } else { " " };
            out.push_str(&format!(
                "{} {:<16} {:>8} ({:>5.1}%)\n",
                marker,
                status.label(),
                count,
                snapshot.stats.share(status)
            ));
        }
        out.push_str(&format!("  {:<16} {:>8}\n", "Total", snapshot.stats.total()));
        if snapshot.stats_track.failed() {
            out.push_str("  (集計の取得に失敗しました)\n");
        }
    }

    let heading = snapshot
        .status
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| "All".to_string());
    out.push_str(&format!("\n-- {} Details --\n", heading));

    if snapshot.table_track.is_loading() {
        out.push_str("一覧: 読み込み中...\n");
        return out;
    }
    if page.rows.is_empty() {
        out.push_str("トランザクションはありません\n");
        return out;
    }

    out.push_str(&format!("S.No | {}\n", D::Record::HEADERS.join(" | ")));
    for (offset, record) in page.rows.iter().enumerate() {
        let cells: Vec<&str> = record.values().into_iter().map(|v| v.unwrap_or("-")).collect();
        out.push_str(&format!("{} | {}\n", page.first_index + offset, cells.join(" | ")));
    }
    out.push_str(&format!(
        "ページ {}/{}（全{}件）\n",
        page.number, page.total_pages, page.total_items
    ));
    out
}

pub struct Console<D: Dashboard> {
    coordinator: QueryCoordinator<D>,
    navigator: Navigator,
    debounce: Duration,
    export_dir: PathBuf,
    initial: FilterSet,
}

impl<D: Dashboard> Console<D> {
    pub fn new(
        coordinator: QueryCoordinator<D>,
        navigator: Navigator,
        debounce: Duration,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            coordinator,
            navigator,
            debounce,
            export_dir,
            initial: FilterSet::new(),
        }
    }

    /// コマンドラインで指定されたフィルタから始める
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.initial = filters;
        self
    }

    fn print_state(&self) {
        let snapshot = self.coordinator.snapshot();
        let page = self.coordinator.page();
        println!("{}", render(&snapshot, &page));
    }

    pub async fn run(self) -> Result<()> {
        let mut filters = self.initial.clone();
        let mut debouncer = Debouncer::new(filters.clone(), self.debounce);
        let follower = self.coordinator.follow(debouncer.subscribe());

        // 両トラックが落ち着いたら表示する
        let mut revisions = self.coordinator.subscribe();
        let watcher = self.coordinator.clone();
        let printer = tokio::spawn(async move {
            while revisions.changed().await.is_ok() {
                let snapshot = watcher.snapshot();
                if !snapshot.stats_track.is_loading() && !snapshot.table_track.is_loading() {
                    println!("{}", render(&snapshot, &watcher.page()));
                }
            }
        });

        let mut location = self.navigator.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", HELP);

        loop {
            tokio::select! {
                changed = location.changed() => {
                    if changed.is_err() || *location.borrow_and_update() == Route::Login {
                        eprintln!("セッションが無効になりました。再度ログインしてください");
                        break;
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let command = match ConsoleCommand::parse(&line) {
                        Ok(command) => command,
                        Err(message) => {
                            if !message.is_empty() {
                                eprintln!("{}", message);
                            }
                            continue;
                        }
                    };

                    match command {
                        ConsoleCommand::Set { field, value } => {
                            if !D::accepts_filter(&field) {
                                eprintln!("{} のフィルタ項目: {}", D::NAME, D::FILTER_FIELDS.join(", "));
                                continue;
                            }
                            filters.set(field, value);
                            debouncer.push(filters.clone());
                        }
                        ConsoleCommand::Clear { field } => {
                            filters.unset(&field);
                            debouncer.push(filters.clone());
                        }
                        ConsoleCommand::Status(None) => {
                            if let Some(refresh) = self.coordinator.clear_status() {
                                tokio::spawn(refresh);
                            }
                        }
                        ConsoleCommand::Status(Some(name)) => match D::Status::parse_status(&name) {
                            Ok(status) => {
                                tokio::spawn(self.coordinator.select_status(status));
                            }
                            Err(e) => eprintln!("{}", DashboardError::from(e)),
                        },
                        ConsoleCommand::Page(n) => {
                            self.coordinator.set_page(n);
                        }
                        ConsoleCommand::Export(dir) => {
                            let dir = dir.unwrap_or_else(|| self.export_dir.clone());
                            match self.coordinator.export_csv(&dir) {
                                Ok(path) => println!("✔ CSV出力: {}", path.display()),
                                Err(e) if e.is_warning() => eprintln!("⚠ {}", e),
                                Err(e) => return Err(e),
                            }
                        }
                        ConsoleCommand::Show => self.print_state(),
                        ConsoleCommand::Help => println!("{}", HELP),
                        ConsoleCommand::Quit => break,
                    }
                }
            }
        }

        debouncer.cancel();
        follower.abort();
        printer.abort();
        Ok(())
    }
}
