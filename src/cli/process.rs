//! CLI entry-point for batch classification of a workbook.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{config::Settings, llm, pipeline};

/// Default file name of the augmented workbook.
pub const OUTPUT_FILE_NAME: &str = "predictions.xlsx";

/// Args for the `process` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Workbook with `Title` and `Abstract` columns in its first sheet.
    #[arg(long)]
    pub input: PathBuf,
    /// Destination workbook; defaults to `<OUTPUTS_DIR>/predictions.xlsx`.
    #[arg(long, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,
    /// Overwrite the input workbook instead of writing a copy.
    #[arg(long)]
    pub in_place: bool,
    /// Override the configured chat model.
    #[arg(long)]
    pub model: Option<String>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(model) = args.model.clone() {
        settings.model = model;
    }
    let client = llm::client_from_settings(&settings)?;

    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("read {}", args.input.display()))?;
    let output = pipeline::process(&client, &bytes)
        .await
        .with_context(|| format!("classify references in {}", args.input.display()))?;

    let dest = if args.in_place {
        args.input.clone()
    } else {
        args.output
            .clone()
            .unwrap_or_else(|| settings.join_output(OUTPUT_FILE_NAME))
    };
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&dest, &output.workbook)
        .await
        .with_context(|| format!("write {}", dest.display()))?;

    info!(
        path = %dest.display(),
        predictions = output.predictions.len(),
        "saved predictions workbook"
    );
    println!("{}", dest.display());
    Ok(())
}
