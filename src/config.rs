use crate::error::{DashboardError, Result};
use hrms_dashboard_common::PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const API_URL_ENV: &str = "HRMS_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub debounce_ms: u64,
    pub page_size: usize,
    /// 未設定ならトランスポートの既定値（タイムアウトなし）
    pub timeout_seconds: Option<u64>,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".into(),
            debounce_ms: 500,
            page_size: PAGE_SIZE,
            timeout_seconds: None,
            export_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DashboardError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("hrms-dashboard"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// セッション（トークン・ユーザー）の保存先
    pub fn session_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("session.json"))
    }

    /// 環境変数によるAPIのURL指定（未設定・空白のみならNone）
    pub fn api_url_override() -> Option<String> {
        std::env::var(API_URL_ENV).ok().filter(|url| !url.trim().is_empty())
    }

    pub fn api_base_url(&self) -> String {
        self.resolve_api_url(Self::api_url_override())
    }

    /// 上書き値があればそれを、無ければ保存済みの値を使う
    pub fn resolve_api_url(&self, override_url: Option<String>) -> String {
        override_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.api_base_url.clone())
    }

    pub fn set_api_base_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "APIのURLは http:// または https:// で始めてください: {}",
                url
            )));
        }
        self.api_base_url = url;
        self.save()
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
