mod auth;
mod client;
mod transactions;

pub use auth::AuthService;
pub use client::ApiClient;
pub use transactions::{transactions_query, Fetched, TransactionSource};
