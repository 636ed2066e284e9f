//! Core application layer
//!
//! This module provides:
//! - Customer business rules (create/update validation, duplicate checks)
//! - Query filter construction
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system

pub mod services;
pub mod filter;
pub mod config;
pub mod logging;
pub mod error;

pub use services::CustomerService;
pub use filter::{Criterion, Filter};
pub use config::Config;
pub use logging::Logger;
pub use error::{ApiError, Result};
