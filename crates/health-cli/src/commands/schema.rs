//! Schema command

use anyhow::Result;

use health_core::db::schema::ddl;

use super::Context;
use crate::output::OutputFormat;

pub fn execute(ctx: &Context) -> Result<()> {
    let statements = ddl();
    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statements)?),
        OutputFormat::Table => {
            for statement in statements {
                println!("{};\n", statement);
            }
        }
    }
    Ok(())
}
