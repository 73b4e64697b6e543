use super::storage::SessionStorage;
use crate::error::Result;
use hrms_dashboard_common::User;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";

/// ログイン済みの資格情報（トークンとユーザーは常に対）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub token: String,
    pub user: User,
}

/// ある時点のセッション状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub auth: Option<Authenticated>,
    /// initialize() 完了前はtrue
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.as_ref().map(|a| &a.user)
    }
}

/// セッションストア
///
/// メモリ上の状態と永続ストレージを常に一致させる。
/// 状態変化は `subscribe()` で購読できる。
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot {
            auth: None,
            loading: true,
        });
        Self { storage, state }
    }

    /// 起動時に保存済みセッションを復元する
    ///
    /// 片方だけ残っている・解析できない場合は保存内容を消して未ログイン扱い。
    /// loading は最初の呼び出しで一度だけ false になる。
    pub fn initialize(&self) {
        if !self.state.borrow().loading {
            debug!("セッションは初期化済み");
            return;
        }

        let restored = self.restore();
        if let Some(auth) = &restored {
            info!("セッションを復元しました: {}", auth.user.username);
        }

        self.state.send_modify(|s| {
            s.auth = restored;
            s.loading = false;
        });
    }

    fn restore(&self) -> Option<Authenticated> {
        let token = self.storage.get_item(TOKEN_KEY);
        let user = self.storage.get_item(USER_KEY);

        match (token, user) {
            (Ok(Some(token)), Ok(Some(raw_user))) if !token.is_empty() => {
                match User::from_json(&raw_user) {
                    Ok(user) => return Some(Authenticated { token, user }),
                    Err(e) => warn!("保存済みユーザーを解析できません: {}", e),
                }
            }
            (Ok(None), Ok(None)) => {}
            (Err(e), _) | (_, Err(e)) => warn!("セッションを読み込めません: {}", e),
            _ => warn!("保存済みセッションが不完全なため破棄します"),
        }

        self.clear_storage();
        None
    }

    /// ログイン成功後に呼ぶ。リモート呼び出しは行わない
    pub fn login(&self, token: String, user: User) -> Result<()> {
        let raw_user = user.to_json()?;
        self.storage
            .set_items(&[(TOKEN_KEY, token.as_str()), (USER_KEY, raw_user.as_str())])?;

        info!("ログイン: {} ({})", user.username, user.role);
        self.state.send_modify(|s| {
            s.auth = Some(Authenticated { token, user });
        });
        Ok(())
    }

    /// 何度呼んでもよい
    pub fn logout(&self) {
        self.clear_storage();
        let was_authenticated = self.state.borrow().is_authenticated();
        self.state.send_modify(|s| s.auth = None);
        if was_authenticated {
            info!("ログアウトしました");
        }
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.remove_items(&[TOKEN_KEY, USER_KEY]) {
            warn!("保存済みセッションの削除に失敗: {}", e);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().auth.as_ref().map(|a| a.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }
}
