//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod classify;
pub mod config;
pub mod ingest;
pub mod schema;

use std::io::Read;

use anyhow::{Context as _, Result};

use crate::output::OutputFormat;

/// Shared context for all commands
pub struct Context {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Progress messages stay off stdout in quiet mode and for JSON output
    pub fn silent(&self) -> bool {
        self.quiet || self.format == OutputFormat::Json
    }
}

/// Read a document from a file path, or from stdin when the path is `-`
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read document from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}
