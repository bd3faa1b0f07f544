//! Ingestion entry point
//!
//! Classifies an export's metric records, maps every metric and workout to
//! rows and writes them over one connection. By default rows are committed
//! as they are written; atomic mode wraps the whole call in a transaction.

use std::collections::BTreeMap;

use serde::Serialize;

use super::classifier::{classify_all, Classification, DroppedRecord};
use super::mapper::RowMapper;
use crate::config::IngestConfig;
use crate::db::{Database, MemorySink, Row, RowSink, SqliteSink, Table};
use crate::error::Result;
use crate::models::{Export, IngestResponse, Workout};

/// Counts reported for one successful ingestion call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub metrics_processed: usize,
    pub workouts_processed: usize,
    pub metrics_dropped: usize,
    pub rows_written: usize,
    pub rows_by_table: BTreeMap<String, usize>,
    pub dropped: Vec<DroppedRecord>,
}

impl IngestSummary {
    pub fn into_response(self) -> IngestResponse {
        IngestResponse::Success {
            metrics_processed: self.metrics_processed,
            workouts_processed: self.workouts_processed,
            metrics_dropped: self.metrics_dropped,
            rows_written: self.rows_written,
        }
    }
}

impl From<Result<IngestSummary>> for IngestResponse {
    fn from(result: Result<IngestSummary>) -> Self {
        match result {
            Ok(summary) => summary.into_response(),
            Err(e) => IngestResponse::error(e.to_string()),
        }
    }
}

/// Map a classified export into any sink, metrics first then workouts
pub async fn write_export<S: RowSink + ?Sized>(
    sink: &mut S,
    classification: &Classification,
    workouts: &[Workout],
    user_id: &str,
) -> Result<BTreeMap<Table, usize>> {
    let mut mapper = RowMapper::new(sink, user_id);

    for metric in &classification.metrics {
        mapper.write_metric(metric).await?;
    }
    for workout in workouts {
        mapper.write_workout(workout).await?;
    }

    for (table, count) in mapper.written() {
        log::debug!("[ingest] {} rows -> {}", count, table);
    }

    Ok(mapper.into_written())
}

fn summarize(
    classification: Classification,
    workouts: usize,
    written: BTreeMap<Table, usize>,
) -> IngestSummary {
    IngestSummary {
        metrics_processed: classification.metrics.len(),
        workouts_processed: workouts,
        metrics_dropped: classification.dropped_count(),
        rows_written: written.values().sum(),
        rows_by_table: written
            .into_iter()
            .map(|(table, count)| (table.name().to_string(), count))
            .collect(),
        dropped: classification.dropped,
    }
}

/// Ingestion service bound to one database
#[derive(Clone)]
pub struct Ingestor {
    db: Database,
    atomic: bool,
}

impl Ingestor {
    pub fn new(db: Database) -> Self {
        Self { db, atomic: false }
    }

    /// Run every call inside a single transaction
    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub async fn from_config(config: &IngestConfig) -> Result<Self> {
        let db = Database::open(config.db_path.clone()).await?;
        Ok(Self::new(db).with_atomic(config.atomic))
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }

    /// Persist one export for `user_id`
    ///
    /// Returns on the first row that fails to map or write. Rows written
    /// before that stay committed unless the ingestor is atomic.
    pub async fn ingest(&self, export: &Export, user_id: &str) -> Result<IngestSummary> {
        let classification = classify_all(&export.data.metrics);
        let workouts = &export.data.workouts;

        log::info!(
            "[ingest] user={} metrics={} dropped={} workouts={} atomic={}",
            user_id,
            classification.metrics.len(),
            classification.dropped_count(),
            workouts.len(),
            self.atomic
        );

        let written = if self.atomic {
            let mut tx = self.db.pool.begin().await?;
            let written = {
                let mut sink = SqliteSink::new(&mut *tx);
                write_export(&mut sink, &classification, workouts, user_id).await?
            };
            tx.commit().await?;
            written
        } else {
            let mut conn = self.db.pool.acquire().await?;
            let mut sink = SqliteSink::new(&mut *conn);
            write_export(&mut sink, &classification, workouts, user_id).await?
        };

        let summary = summarize(classification, workouts.len(), written);
        log::info!(
            "[ingest] user={} wrote {} rows across {} tables",
            user_id,
            summary.rows_written,
            summary.rows_by_table.len()
        );
        Ok(summary)
    }

    /// Same as [`Ingestor::ingest`] but reports the failure as a response
    pub async fn ingest_response(&self, export: &Export, user_id: &str) -> IngestResponse {
        let result = self.ingest(export, user_id).await;
        if let Err(e) = &result {
            log::error!("[ingest] user={} failed: {}", user_id, e);
        }
        result.into()
    }
}

/// Classify and map without touching a database
pub async fn dry_run(export: &Export, user_id: &str) -> Result<(IngestSummary, Vec<Row>)> {
    let classification = classify_all(&export.data.metrics);
    let mut sink = MemorySink::new();
    let written = write_export(&mut sink, &classification, &export.data.workouts, user_id).await?;

    let summary = summarize(classification, export.data.workouts.len(), written);
    Ok((summary, sink.rows))
}
