//! セッション管理
//!
//! トークンとユーザーは必ず両方あるか両方ないかのどちらか。
//! 永続化先は `SessionStorage` で差し替える（CLIはファイル、テストはメモリ）。

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::{Authenticated, SessionSnapshot, SessionStore, TOKEN_KEY, USER_KEY};
