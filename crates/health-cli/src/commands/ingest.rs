//! Ingest command
//!
//! Decodes an export document and writes it to the database, or maps it
//! into memory only with `--dry-run`.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use health_core::{dry_run, DroppedRecord, Export, IngestConfig, IngestResponse, Ingestor};

use super::{read_input, Context};
use crate::output::{print_error, print_info, print_output, print_success, OutputFormat};

#[derive(Args)]
pub struct IngestArgs {
    /// Export document path, or `-` for stdin
    pub input: String,

    /// User id to record (falls back to HEALTH_DEFAULT_USER)
    #[arg(long, short, env = "HEALTH_USER_ID")]
    pub user: Option<String>,

    /// Write the whole document in one transaction
    #[arg(long)]
    pub atomic: bool,

    /// Classify and map without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

/// Row count per table for table display
#[derive(Debug, Serialize, Tabled)]
pub struct TableCountRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Rows")]
    pub rows: usize,
}

/// Dropped record for table display
#[derive(Debug, Serialize, Tabled)]
pub struct DroppedRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Reason")]
    pub reason: String,
}

impl From<&DroppedRecord> for DroppedRow {
    fn from(record: &DroppedRecord) -> Self {
        Self {
            index: record.index,
            name: record.name.clone().unwrap_or_else(|| "-".to_string()),
            reason: record.reason.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DryRunOutput<'a> {
    response: IngestResponse,
    rows_by_table: &'a BTreeMap<String, usize>,
    dropped: &'a [DroppedRecord],
}

/// Unwrap a step's result, or print the failure response and bail out
macro_rules! or_fail {
    ($ctx:expr, $result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => return fail($ctx, IngestResponse::error(format!("{:#}", e))),
        }
    };
}

pub async fn execute(ctx: &Context, args: IngestArgs) -> Result<()> {
    let text = or_fail!(ctx, read_input(&args.input));
    let export = or_fail!(ctx, Export::from_json(&text));

    let config = or_fail!(ctx, IngestConfig::from_env());
    let user_id = config.resolve_user_id(args.user.as_deref());

    if args.dry_run {
        return dry_run_export(ctx, &export, &user_id).await;
    }

    let ingestor =
        or_fail!(ctx, Ingestor::from_config(&config).await).with_atomic(config.atomic || args.atomic);
    print_info(
        &format!("Ingesting {} for user '{}'...", args.input, user_id),
        ctx.silent(),
    );

    let summary = or_fail!(ctx, ingestor.ingest(&export, &user_id).await);
    if ctx.format == OutputFormat::Table {
        print_drops(ctx, &summary.dropped)?;
    }
    print_response(ctx, &summary.into_response())?;
    print_success("Ingestion complete", ctx.silent());
    Ok(())
}

async fn dry_run_export(ctx: &Context, export: &Export, user_id: &str) -> Result<()> {
    let (summary, _rows) = or_fail!(ctx, dry_run(export, user_id).await);

    match ctx.format {
        OutputFormat::Json => {
            let output = DryRunOutput {
                response: summary.clone().into_response(),
                rows_by_table: &summary.rows_by_table,
                dropped: &summary.dropped,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let rows: Vec<TableCountRow> = summary
                .rows_by_table
                .iter()
                .map(|(table, rows)| TableCountRow {
                    table: table.clone(),
                    rows: *rows,
                })
                .collect();
            print_output(&rows, ctx.format)?;
            print_drops(ctx, &summary.dropped)?;
            print_response(ctx, &summary.into_response())?;
        }
    }

    print_info("Dry run: nothing was written", ctx.silent());
    Ok(())
}

fn print_drops(ctx: &Context, dropped: &[DroppedRecord]) -> Result<()> {
    if dropped.is_empty() {
        return Ok(());
    }
    print_info(&format!("Dropped {} metric record(s):", dropped.len()), ctx.silent());
    let rows: Vec<DroppedRow> = dropped.iter().map(DroppedRow::from).collect();
    print_output(&rows, ctx.format)
}

/// Key/value row for the response table
#[derive(Debug, Serialize, Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_response(ctx: &Context, response: &IngestResponse) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(response)?),
        OutputFormat::Table => {
            let rows = match response {
                IngestResponse::Success {
                    metrics_processed,
                    workouts_processed,
                    metrics_dropped,
                    rows_written,
                } => vec![
                    ("status", "success".to_string()),
                    ("metricsProcessed", metrics_processed.to_string()),
                    ("workoutsProcessed", workouts_processed.to_string()),
                    ("metricsDropped", metrics_dropped.to_string()),
                    ("rowsWritten", rows_written.to_string()),
                ],
                IngestResponse::Error { message } => vec![
                    ("status", "error".to_string()),
                    ("message", message.clone()),
                ],
            };
            let rows: Vec<FieldRow> = rows
                .into_iter()
                .map(|(field, value)| FieldRow {
                    field: field.to_string(),
                    value,
                })
                .collect();
            print_output(&rows, ctx.format)?;
        }
    }
    Ok(())
}

/// Print the failure response and exit non-zero
fn fail(ctx: &Context, response: IngestResponse) -> Result<()> {
    print_response(ctx, &response)?;
    let message = match response {
        IngestResponse::Error { message } => message,
        IngestResponse::Success { .. } => "ingestion failed".to_string(),
    };
    print_error("Ingestion failed");
    Err(anyhow!(message))
}
