//! Command-line interface wiring for biblio-assistant.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod preview;
pub mod process;
pub mod serve;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Bibliographic reference classifier", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Process(args) => process::run(args, settings).await,
            Commands::Preview(args) => preview::run(args).await,
            Commands::Serve(args) => serve::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every reference of a workbook and append a Predictions sheet.
    Process(process::Args),
    /// Print the conversations that would be sent, without calling the model.
    Preview(preview::Args),
    /// Serve the upload page and prediction endpoint.
    Serve(serve::Args),
}
