//! # health-core
//!
//! Ingestion core for Health Auto Export documents, shared by the CLI.
//!
//! This crate provides:
//! - Export document models and the metric value model (`models` module)
//! - Metric classification and row mapping (`services` module)
//! - SQLite storage and the table contract (`db` module)
//! - Environment configuration (`config` module)
//! - Unified error handling (`error` module)

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

// Re-exports for convenience
pub use config::IngestConfig;
pub use db::{Database, Table};
pub use error::{Error, Result};

pub use models::{Export, HealthData, IngestResponse, Metric, MetricKind, Workout};

pub use services::{
    classify, classify_all, dry_run, Classification, DropReason, DroppedRecord, IngestSummary,
    Ingestor, RowMapper,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
