//! HRMS Dashboard Common Library
//!
//! CLIと対話コンソールで共有される型とユーティリティ（I/Oなし）

pub mod dashboard;
pub mod error;
pub mod export;
pub mod filters;
pub mod pagination;
pub mod status;
pub mod types;
pub mod validation;

pub use dashboard::{Dashboard, Gems, Gpf};
pub use error::{Error, Result};
pub use export::{to_csv, CsvRecord};
pub use filters::{clean_filters, FilterSet, GemsFilters, GpfFilters};
pub use pagination::{paginate, Page, PAGE_SIZE};
pub use status::{GemsStatus, GpfStatus, TransactionStatus};
pub use types::{AuthResponse, Credentials, GemsTransaction, GpfTransaction, StatCounts, StatsResponse, User};
pub use validation::{validate_login, validate_signup, FormErrors, FormField};
