//! HRMS GEMS/GPF ダッシュボード（CLIクライアント）

pub mod api;
pub mod cli;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod router;
pub mod session;
