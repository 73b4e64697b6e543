//! Export core modules shared across the CLI and the interactive console.

pub mod csv_core;

pub use csv_core::{to_csv, CsvRecord};
