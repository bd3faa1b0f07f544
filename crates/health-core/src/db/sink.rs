//! Row sinks
//!
//! The mapper pushes rows into a [`RowSink`] one at a time. The SQLite sink
//! issues one INSERT per row over the connection it was given; the memory
//! sink collects rows for dry runs and tests.

use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::row::{Row, SqlValue};
use crate::error::Result;

#[async_trait]
pub trait RowSink: Send {
    /// Persist one row. An error here stops the ingestion call.
    async fn write(&mut self, row: Row) -> Result<()>;
}

/// Writes rows over a single borrowed connection (plain or transactional)
pub struct SqliteSink<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteSink<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> RowSink for SqliteSink<'c> {
    async fn write(&mut self, row: Row) -> Result<()> {
        row.validate()?;

        let sql = row.insert_sql();
        let mut query = sqlx::query(&sql);
        for (_, value) in row.values() {
            query = match value {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Integer(v) => query.bind(*v),
                SqlValue::Real(v) => query.bind(*v),
                SqlValue::Text(v) => query.bind(v.clone()),
            };
        }

        query.execute(&mut *self.conn).await?;
        Ok(())
    }
}

/// Collects rows in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<Row>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RowSink for MemorySink {
    async fn write(&mut self, row: Row) -> Result<()> {
        row.validate()?;
        self.rows.push(row);
        Ok(())
    }
}
