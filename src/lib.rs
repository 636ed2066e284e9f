//! Customer API Library
//!
//! A small REST API over customer records, guarded by a shared API key.

pub mod api;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::Config;
pub use db::{CustomerStore, DatabaseManager};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
