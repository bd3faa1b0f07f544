//! Services module

pub mod classifier;
pub mod ingest;
pub mod mapper;
pub mod timestamp;

pub use classifier::{
    classify, classify_all, detect_kind, Classification, DropReason, DroppedRecord, FieldSet,
};
pub use ingest::{dry_run, write_export, IngestSummary, Ingestor};
pub use mapper::{RowMapper, SOURCE};
pub use timestamp::{parse_timestamp, storage_date, storage_timestamp};
