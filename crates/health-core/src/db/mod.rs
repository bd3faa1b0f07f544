//! Database module - SQLx with SQLite

pub mod row;
pub mod schema;
pub mod sink;

use crate::error::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::PathBuf;

pub use row::{Row, SqlValue};
pub use schema::{Column, ColumnType, Table};
pub use sink::{MemorySink, RowSink, SqliteSink};

/// Database state
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Create a new database connection with a specific path
    pub async fn open(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        log::info!("Connecting to database: {}", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let db = Self { pool };
        db.create_tables().await?;

        Ok(db)
    }

    /// In-memory database. A single connection that never expires, since each
    /// SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.create_tables().await?;

        Ok(db)
    }

    /// Create every table and index of the storage contract if absent
    async fn create_tables(&self) -> Result<()> {
        log::info!("Creating health tables...");

        for statement in schema::ddl() {
            sqlx::query(&statement).execute(&self.pool).await?;
        }

        log::info!("Health tables ready ({} tables)", Table::ALL.len());
        Ok(())
    }

    /// Number of rows currently stored in a table
    pub async fn count_rows(&self, table: Table) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count.0)
    }
}
