//! Storage rows produced by the mapper

use uuid::Uuid;

use super::schema::Table;
use crate::error::{Error, Result};

/// A single bound value. Absent optionals are `Null`, never zero.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            SqlValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

/// Flags are stored as 0/1
impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One row destined for one table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: Table,
    values: Vec<(&'static str, SqlValue)>,
}

impl Row {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            values: Vec::with_capacity(table.columns().len()),
        }
    }

    /// Set a column value
    pub fn with(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn values(&self) -> &[(&'static str, SqlValue)] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    /// Check the row against the table contract: every column declared,
    /// no column set twice, and NOT NULL columns present and non-null.
    pub fn validate(&self) -> Result<()> {
        for (i, (name, value)) in self.values.iter().enumerate() {
            let column = self.table.column(name).ok_or_else(|| {
                Error::internal(format!("{} has no column '{}'", self.table, name))
            })?;
            if !column.nullable && value.is_null() {
                return Err(Error::internal(format!(
                    "{}.{} cannot be null",
                    self.table, name
                )));
            }
            if self.values[..i].iter().any(|(other, _)| other == name) {
                return Err(Error::internal(format!(
                    "{}.{} set more than once",
                    self.table, name
                )));
            }
        }

        for column in self.table.columns().iter().filter(|c| !c.nullable) {
            if self.get(column.name).is_none() {
                return Err(Error::internal(format!(
                    "{}.{} is required",
                    self.table, column.name
                )));
            }
        }

        Ok(())
    }

    pub fn insert_sql(&self) -> String {
        let columns: Vec<&str> = self.values.iter().map(|(name, _)| *name).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders
        )
    }
}
