//! HTTPクライアント
//!
//! 送信直前にセッションのトークンを付与し、401/403を受けたら
//! どの呼び出し元であってもログアウトして /login へ遷移させる。

use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::router::{Navigator, Route};
use crate::session::SessionStore;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Navigator,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Arc<SessionStore>,
        navigator: Navigator,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    pub fn from_config(config: &Config, session: Arc<SessionStore>, navigator: Navigator) -> Result<Self> {
        Self::new(&config.api_base_url(), session, navigator, config.timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let request = self.http.get(self.url(path)).query(query);
        let response = self.send(path, request).await?;
        decode(path, response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        let response = self.send(path, request).await?;
        decode(path, response).await
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response> {
        // トークンは送信直前に読む（途中でログアウトされていれば付けない）
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!("リクエスト送信: {}", path);
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("認証が拒否されました (HTTP {}): {}", status.as_u16(), path);
            self.session.logout();
            self.navigator.navigate(Route::Login);
            return Err(DashboardError::Unauthorized(status.as_u16()));
        }

        if !status.is_success() {
            return Err(DashboardError::Http {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| DashboardError::Decode(format!("{}: {}", path, e)))
}
