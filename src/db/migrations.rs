//! Database migrations
//!
//! Each migration runs once, inside its own transaction, and is recorded in
//! `schema_migrations`.

use crate::core::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Customers table
const MIGRATION_V1: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    _id TEXT PRIMARY KEY,
    id REAL NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password TEXT,
    document TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_customers_password ON customers(password);
"#;

/// Ordered list of (version, SQL) pairs
const MIGRATIONS: &[(i64, &str)] = &[(1, MIGRATION_V1)];

/// Latest schema version this build knows about
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|(version, _)| *version).unwrap_or(0)
}

/// Current schema version recorded in the database
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

/// Apply every migration newer than the recorded schema version
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(MIGRATION_TABLE)?;

    let current = current_version(conn)?;

    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        info!(version, "Applying database migration");

        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            params![version],
        )?;
        tx.commit()?;
    }

    Ok(())
}
