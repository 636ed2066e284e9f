//! Database manager implementation
//!
//! SQLite connection pool (r2d2) with async wrappers that move blocking
//! database work onto tokio's blocking thread pool.

use crate::core::error::{ApiError, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tokio::task;

/// Database manager with connection pool
#[derive(Clone)]
pub struct DatabaseManager {
    pool: Pool<SqliteConnectionManager>,
}

impl DatabaseManager {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(db_path: &Path, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::Internal(format!("Failed to create database directory {:?}: {}", parent, e))
            })?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(Duration::from_secs(30))
            .build(manager)
            .map_err(|e| ApiError::Pool(e.to_string()))?;

        let manager = Self { pool };
        manager.migrate()?;

        Ok(manager)
    }

    /// In-memory database for tests; a single connection so every query sees the same data
    pub fn new_in_memory() -> Result<Self> {
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(30))
            .build(SqliteConnectionManager::memory())
            .map_err(|e| ApiError::Pool(e.to_string()))?;

        let manager = Self { pool };
        manager.migrate()?;

        Ok(manager)
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| ApiError::Pool(e.to_string()))
    }

    /// Run a database operation on the blocking thread pool
    pub async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| ApiError::Pool(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| ApiError::Task(format!("Database task panicked: {}", e)))?
    }

    /// Run a database operation inside a transaction
    ///
    /// Commits when the closure returns Ok, rolls back otherwise.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| ApiError::Pool(e.to_string()))?;

            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await
        .map_err(|e| ApiError::Task(format!("Transaction task panicked: {}", e)))?
    }

    /// Apply pending schema migrations
    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.get_connection()?;
        crate::db::migrations::run_migrations(&mut conn)
    }

    /// Get the configured pool size
    pub fn pool_size(&self) -> u32 {
        self.pool.max_size()
    }
}
