//! Classify command
//!
//! Shows the variant each metric record resolves to, without writing.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use health_core::{classify, Export};

use super::{read_input, Context};
use crate::output::{print_info, print_output};

#[derive(Args)]
pub struct ClassifyArgs {
    /// Export document path, or `-` for stdin
    pub input: String,
}

/// One metric record for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ClassifyRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Samples")]
    pub samples: usize,
    #[tabled(rename = "Status")]
    pub status: String,
}

pub fn execute(ctx: &Context, args: ClassifyArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let export = Export::from_json(&text)?;

    let rows: Vec<ClassifyRow> = export
        .data
        .metrics
        .iter()
        .enumerate()
        .map(|(index, record)| match classify(record) {
            Ok(metric) => ClassifyRow {
                index,
                name: metric.name().to_string(),
                kind: metric.kind().to_string(),
                samples: metric.sample_count(),
                status: "ok".to_string(),
            },
            Err(reason) => ClassifyRow {
                index,
                name: record
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("-")
                    .to_string(),
                kind: "-".to_string(),
                samples: 0,
                status: format!("dropped: {}", reason),
            },
        })
        .collect();

    let dropped = rows.iter().filter(|r| r.status != "ok").count();
    print_output(&rows, ctx.format)?;
    print_info(
        &format!(
            "{} metric record(s), {} dropped, {} workout(s)",
            rows.len(),
            dropped,
            export.data.workouts.len()
        ),
        ctx.silent(),
    );
    Ok(())
}
