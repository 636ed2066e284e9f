//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - The customer store and its SQLite implementation
//! - Database migrations
//! - The customer document model

pub mod manager;
pub mod models;
pub mod repository;
pub mod migrations;

pub use manager::DatabaseManager;
pub use models::Customer;
pub use repository::{CustomerStore, SqliteCustomerStore};
