//! Health Auto Export ingestion CLI
//!
//! Ingests export documents into SQLite, previews classification and
//! prints the storage schema.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use health_core::config::DB_PATH_ENV;

#[derive(Parser)]
#[command(name = "health-ingest")]
#[command(author, version, about = "Health Auto Export ingestion CLI", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Override database path (or set HEALTH_DB_PATH env var)
    #[arg(long, env = "HEALTH_DB_PATH", global = true)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest an export document into the database
    Ingest(commands::ingest::IngestArgs),

    /// Show how each metric record in a document is classified
    Classify(commands::classify::ClassifyArgs),

    /// Print the storage schema DDL
    Schema,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    // Set up database path if provided
    if let Some(db_path) = &cli.db {
        std::env::set_var(DB_PATH_ENV, db_path);
    }

    // Create context for commands
    let ctx = commands::Context {
        format: cli.format,
        quiet: cli.quiet,
    };

    // Execute command
    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(&ctx, args).await,
        Commands::Classify(args) => commands::classify::execute(&ctx, args),
        Commands::Schema => commands::schema::execute(&ctx),
        Commands::Config { action } => commands::config::execute(&ctx, action),
    }
}
