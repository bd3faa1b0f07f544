//! Config commands
//!
//! Shows the effective ingestion configuration.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use health_core::config::{
    get_db_path, ATOMIC_INGEST_ENV, DB_PATH_ENV, DEFAULT_USER_ENV, DEFAULT_USER_ID,
};

use super::Context;
use crate::output::{print_error, print_output};

/// Env var consulted by `ingest --user`
const USER_ID_ENV: &str = "HEALTH_USER_ID";

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
}

/// Config row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

pub fn execute(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let rows = get_all_config(ctx);
    print_output(&rows, ctx.format)?;

    if let Err(e) = health_core::IngestConfig::from_env() {
        print_error(&e.to_string());
    }
    Ok(())
}

fn env_source(key: &str) -> String {
    if std::env::var(key).is_ok() { "env" } else { "default" }.to_string()
}

fn get_all_config(ctx: &Context) -> Vec<ConfigRow> {
    let mut rows = vec![ConfigRow {
        key: "format".to_string(),
        value: ctx.format.to_string(),
        source: "flag".to_string(),
    }];

    let db_path = get_db_path()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "Unknown".to_string());
    rows.push(ConfigRow {
        key: DB_PATH_ENV.to_string(),
        value: db_path,
        source: env_source(DB_PATH_ENV),
    });

    rows.push(ConfigRow {
        key: DEFAULT_USER_ENV.to_string(),
        value: std::env::var(DEFAULT_USER_ENV).unwrap_or_else(|_| DEFAULT_USER_ID.to_string()),
        source: env_source(DEFAULT_USER_ENV),
    });

    rows.push(ConfigRow {
        key: USER_ID_ENV.to_string(),
        value: std::env::var(USER_ID_ENV).unwrap_or_else(|_| "Not set".to_string()),
        source: if std::env::var(USER_ID_ENV).is_ok() { "env" } else { "n/a" }.to_string(),
    });

    rows.push(ConfigRow {
        key: ATOMIC_INGEST_ENV.to_string(),
        value: std::env::var(ATOMIC_INGEST_ENV).unwrap_or_else(|_| "false".to_string()),
        source: env_source(ATOMIC_INGEST_ENV),
    });

    rows
}
