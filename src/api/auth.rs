//! ログイン・サインアップ
//!
//! トークンの発行はサーバー側。ここでは受け取ったトークンの保存と遷移だけを行う。

use super::client::ApiClient;
use crate::error::{DashboardError, Result};
use crate::router::{Navigator, Route, RouteDecision};
use crate::session::SessionStore;
use hrms_dashboard_common::{validate_login, validate_signup, AuthResponse, Credentials, User};
use std::sync::Arc;
use tracing::warn;

const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";

const INVALID_CREDENTIALS: &str = "Invalid username or password";
const LOGIN_FAILED: &str = "Login failed. Please try again.";
const SIGNUP_FAILED: &str = "Signup failed. Please try again.";

impl ApiClient {
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.post_json(LOGIN_PATH, credentials).await
    }

    pub async fn signup(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.post_json(SIGNUP_PATH, credentials).await
    }
}

pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    navigator: Navigator,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>, navigator: Navigator) -> Self {
        Self { api, session, navigator }
    }

    /// 公開画面（/login, /signup）に入れるか確かめる
    ///
    /// ログイン済みならダッシュボードへ送り、既存のセッションには触れずにエラーを返す。
    pub fn enter_public(&self, route: Route) -> Result<()> {
        match self.navigator.open(route.path(), &self.session) {
            RouteDecision::Redirect(Route::Dashboard) => {
                let username = self.session.user().map(|u| u.username).unwrap_or_default();
                Err(DashboardError::AlreadyAuthenticated(username))
            }
            _ => Ok(()),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        self.enter_public(Route::Login)?;
        validate_login(username, password).map_err(DashboardError::Validation)?;

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self.api.login(&credentials).await.map_err(|e| {
            warn!("ログイン失敗: {}", e);
            match e {
                DashboardError::Unauthorized(_) => DashboardError::AuthFailed(INVALID_CREDENTIALS.into()),
                DashboardError::Http { status, .. } if (400..500).contains(&status) => {
                    DashboardError::AuthFailed(INVALID_CREDENTIALS.into())
                }
                _ => DashboardError::AuthFailed(LOGIN_FAILED.into()),
            }
        })?;

        let (token, user) = response
            .into_session()
            .ok_or_else(|| DashboardError::AuthFailed(INVALID_CREDENTIALS.into()))?;

        self.establish(token, user)
    }

    pub async fn signup(&self, username: &str, password: &str, confirm_password: &str) -> Result<User> {
        self.enter_public(Route::Signup)?;
        validate_signup(username, password, confirm_password).map_err(DashboardError::Validation)?;

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self.api.signup(&credentials).await.map_err(|e| {
            warn!("サインアップ失敗: {}", e);
            DashboardError::AuthFailed(SIGNUP_FAILED.into())
        })?;

        let (token, user) = response
            .into_session()
            .ok_or_else(|| DashboardError::AuthFailed(SIGNUP_FAILED.into()))?;

        self.establish(token, user)
    }

    fn establish(&self, token: String, user: User) -> Result<User> {
        self.session.login(token, user.clone())?;
        self.navigator.navigate(Route::Dashboard);
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.logout();
        self.navigator.navigate(Route::Login);
    }
}
