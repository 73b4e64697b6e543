use clap::Parser;
use dialoguer::{Input, Password};
use hrms_dashboard::api::{ApiClient, AuthService};
use hrms_dashboard::cli::{Cli, Commands, DashboardAction};
use hrms_dashboard::config::{Config, API_URL_ENV};
use hrms_dashboard::console::{render, Console};
use hrms_dashboard::coordinator::QueryCoordinator;
use hrms_dashboard::error::{DashboardError, Result};
use hrms_dashboard::router::{Navigator, Route, RouteDecision};
use hrms_dashboard::session::{FileStorage, SessionStore};
use hrms_dashboard_common::{Dashboard, FilterSet, Gems, Gpf, TransactionStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

struct App {
    config: Config,
    session: Arc<SessionStore>,
    navigator: Navigator,
    api: Arc<ApiClient>,
    auth: AuthService,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        if e.is_warning() {
            eprintln!("⚠ {}", e);
        } else {
            eprintln!("✖ {}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "hrms_dashboard=debug,hrms_dashboard_common=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    let storage = Arc::new(FileStorage::new(Config::session_path()?));
    let session = Arc::new(SessionStore::new(storage));
    session.initialize();

    let navigator = Navigator::default();
    let api = Arc::new(ApiClient::from_config(&config, Arc::clone(&session), navigator.clone())?);
    let auth = AuthService::new(Arc::clone(&api), Arc::clone(&session), navigator.clone());

    let app = App {
        config,
        session,
        navigator,
        api,
        auth,
    };

    match cli.command {
        Commands::Login { username } => {
            if let Err(DashboardError::AlreadyAuthenticated(name)) = app.auth.enter_public(Route::Login) {
                println!("既に {} としてログインしています（切り替えるには `hrms-dashboard logout`）", name);
                return Ok(());
            }
            let username = prompt_username(username)?;
            let password = Password::new()
                .with_prompt("パスワード")
                .interact()
                .map_err(prompt_error)?;

            let spinner = spinner("ログイン中...");
            let result = app.auth.login(&username, &password).await;
            spinner.finish_and_clear();

            let user = result?;
            println!("✔ ログインしました: {} ({})", user.username, user.role);
        }

        Commands::Signup { username } => {
            if let Err(DashboardError::AlreadyAuthenticated(name)) = app.auth.enter_public(Route::Signup) {
                println!("既に {} としてログインしています（切り替えるには `hrms-dashboard logout`）", name);
                return Ok(());
            }
            let username = prompt_username(username)?;
            let password = Password::new()
                .with_prompt("パスワード")
                .interact()
                .map_err(prompt_error)?;
            let confirm_password = Password::new()
                .with_prompt("パスワード（確認）")
                .interact()
                .map_err(prompt_error)?;

            let spinner = spinner("アカウント作成中...");
            let result = app.auth.signup(&username, &password, &confirm_password).await;
            spinner.finish_and_clear();

            let user = result?;
            println!("✔ アカウントを作成しました: {} ({})", user.username, user.role);
        }

        Commands::Logout => {
            let was_authenticated = app.session.is_authenticated();
            app.auth.logout();
            if was_authenticated {
                println!("✔ ログアウトしました");
            } else {
                println!("ログインしていません");
            }
        }

        Commands::Whoami => match app.session.user() {
            Some(user) => {
                println!("ユーザー: {}", user.username);
                println!("ロール: {}", user.role);
            }
            None => println!("ログインしていません"),
        },

        Commands::Gems { action, filters } => {
            run_dashboard::<Gems>(&app, action, FilterSet::from(&filters)).await?;
        }

        Commands::Gpf { action, filters } => {
            run_dashboard::<Gpf>(&app, action, FilterSet::from(&filters)).await?;
        }

        Commands::Config { set_api_url, show } => {
            let mut config = app.config;

            let env_url = Config::api_url_override();

            if let Some(url) = set_api_url {
                config.set_api_base_url(url)?;
                println!("✔ APIのURLを設定しました");
                if env_url.is_some() {
                    println!("⚠ {} が設定されているため、保存したURLは使われません", API_URL_ENV);
                }
            }

            if show {
                println!("設定:");
                match env_url {
                    Some(url) => {
                        println!("  API URL: {} ({} で上書き中)", url, API_URL_ENV);
                        println!("  保存済みのAPI URL: {}", config.api_base_url);
                    }
                    None => println!("  API URL: {}", config.api_base_url),
                }
                println!("  デバウンス: {}ms", config.debounce_ms);
                println!("  ページサイズ: {}", config.page_size);
                match config.timeout_seconds {
                    Some(secs) => println!("  タイムアウト: {}秒", secs),
                    None => println!("  タイムアウト: なし"),
                }
                println!("  CSV出力先: {}", config.export_dir().display());
                println!("  セッション: {}", Config::session_path()?.display());
            }
        }
    }

    Ok(())
}

async fn run_dashboard<D: Dashboard>(app: &App, action: DashboardAction, filters: FilterSet) -> Result<()> {
    // 画面と同じく未ログインなら /login に飛ばされる
    if let RouteDecision::Redirect(Route::Login) = app.navigator.open(D::PAGE_PATH, &app.session) {
        return Err(DashboardError::NotAuthenticated);
    }

    let source: Arc<dyn hrms_dashboard::api::TransactionSource<D>> = app.api.clone();
    let coordinator = QueryCoordinator::<D>::new(source, app.config.page_size);

    match action {
        DashboardAction::Stats => {
            coordinator.preset(filters, None);
            let spinner = spinner(&format!("{} 集計を取得中...", D::NAME));
            coordinator.refresh_stats().await;
            spinner.finish_and_clear();
            ensure_authenticated(app)?;

            let snapshot = coordinator.snapshot();
            if snapshot.stats_track.failed() {
                eprintln!("⚠ 集計の取得に失敗しました（0件として表示）");
            }
            println!("{} ステータス集計", D::NAME);
            for (status, count) in snapshot.stats.iter() {
                println!(
                    "  {:<16} {:>8} ({:>5.1}%)",
                    status.label(),
                    count,
                    snapshot.stats.share(status)
                );
            }
            println!("  {:<16} {:>8}", "Total", snapshot.stats.total());
        }

        DashboardAction::List { status, page } => {
            let status = parse_status::<D>(status)?;
            coordinator.preset(filters, status);
            let spinner = spinner(&format!("{} データを取得中...", D::NAME));
            coordinator.mount().await;
            spinner.finish_and_clear();
            ensure_authenticated(app)?;

            coordinator.set_page(page);
            println!("{}", render(&coordinator.snapshot(), &coordinator.page()));
        }

        DashboardAction::Export { status, output } => {
            let status = parse_status::<D>(status)?;
            coordinator.preset(filters, status);
            let spinner = spinner(&format!("{} 一覧を取得中...", D::NAME));
            coordinator.refresh_table().await;
            spinner.finish_and_clear();
            ensure_authenticated(app)?;

            if coordinator.snapshot().table_track.failed() {
                eprintln!("⚠ 一覧の取得に失敗しました");
            }
            let dir = output.unwrap_or_else(|| app.config.export_dir());
            let path = coordinator.export_csv(&dir)?;
            println!("✔ CSV出力: {}", path.display());
        }

        DashboardAction::Browse => {
            Console::new(
                coordinator,
                app.navigator.clone(),
                app.config.debounce_delay(),
                app.config.export_dir(),
            )
            .with_filters(filters)
            .run()
            .await?;
        }
    }

    Ok(())
}

/// 取得中に401/403でログアウトされていないか
fn ensure_authenticated(app: &App) -> Result<()> {
    if app.session.is_authenticated() {
        Ok(())
    } else {
        Err(DashboardError::NotAuthenticated)
    }
}

fn parse_status<D: Dashboard>(status: Option<String>) -> Result<Option<D::Status>> {
    match status {
        Some(name) => Ok(Some(D::Status::parse_status(&name)?)),
        None => Ok(None),
    }
}

fn prompt_username(username: Option<String>) -> Result<String> {
    match username {
        Some(username) => Ok(username),
        None => Input::<String>::new()
            .with_prompt("ユーザー名")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error),
    }
}

fn prompt_error(e: dialoguer::Error) -> DashboardError {
    DashboardError::Prompt(e.to_string())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
