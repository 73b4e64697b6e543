//! 画面遷移
//!
//! - /login, /signup: 未ログイン専用（ログイン済みなら /dashboard へ）
//! - /dashboard, /gems, /gpf: ログイン必須（未ログインなら /login へ）
//! - それ以外のパス: /dashboard へ
//!
//! セッション初期化中はどのルートもリダイレクトせずプレースホルダを表示する。

use crate::session::SessionStore;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Gems,
    Gpf,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim_end_matches('/');
        match path {
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/dashboard" => Some(Route::Dashboard),
            "/gems" => Some(Route::Gems),
            "/gpf" => Some(Route::Gpf),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Dashboard => "/dashboard",
            Route::Gems => "/gems",
            Route::Gpf => "/gpf",
        }
    }

    /// 未ログイン専用のルートか
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// セッション初期化待ち
    Placeholder,
    Render(Route),
    Redirect(Route),
}

/// パスとセッション状態から表示内容を決める
pub fn resolve(path: &str, session: &SessionStore) -> RouteDecision {
    if session.is_loading() {
        return RouteDecision::Placeholder;
    }

    let Some(route) = Route::from_path(path) else {
        return RouteDecision::Redirect(Route::Dashboard);
    };

    let authenticated = session.is_authenticated();
    match (route.is_public(), authenticated) {
        (true, true) => RouteDecision::Redirect(Route::Dashboard),
        (false, false) => RouteDecision::Redirect(Route::Login),
        _ => RouteDecision::Render(route),
    }
}

/// 現在位置を保持する。どこからでも遷移を要求できる
#[derive(Debug, Clone)]
pub struct Navigator {
    location: Arc<watch::Sender<Route>>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (location, _) = watch::channel(initial);
        Self {
            location: Arc::new(location),
        }
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.location.send_replace(route);
        if previous != route {
            debug!("遷移: {} -> {}", previous, route);
        }
    }

    pub fn current(&self) -> Route {
        *self.location.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.location.subscribe()
    }

    /// パスを解決し、リダイレクトなら遷移まで行う
    pub fn open(&self, path: &str, session: &SessionStore) -> RouteDecision {
        let decision = resolve(path, session);
        match decision {
            RouteDecision::Render(route) | RouteDecision::Redirect(route) => self.navigate(route),
            RouteDecision::Placeholder => {}
        }
        decision
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}
