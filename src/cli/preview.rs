//! CLI entry-point for inspecting prompts without calling the model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{biblio, workbook::Workbook};

/// Args for the `preview` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Workbook with `Title` and `Abstract` columns in its first sheet.
    #[arg(long)]
    pub input: PathBuf,
    /// Number of rows to render.
    #[arg(long, default_value_t = 1)]
    pub limit: usize,
}

#[instrument]
pub async fn run(args: Args) -> Result<()> {
    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("read {}", args.input.display()))?;
    let references = Workbook::from_bytes(bytes).read_references()?;
    let conversations: Vec<_> = references
        .iter()
        .take(args.limit)
        .map(biblio::build)
        .collect();
    println!("{}", serde_json::to_string_pretty(&conversations)?);
    Ok(())
}
