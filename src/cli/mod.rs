//! CLI interface for dirty-bits

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod detect;
pub mod validate;

/// dirty-bits: dirty-bit detection for monorepo CI pipelines
#[derive(Parser)]
#[command(name = "dirty-bits")]
#[command(about = "Classifies monorepo bits as dirty or clean for a commit range", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories
#[derive(Subcommand)]
pub enum Commands {
    /// Detect dirty bits for a commit range or triggering event
    Detect(detect::DetectCommand),
    /// Validate a rules file without running detection
    Validate(validate::ValidateCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Detect(cmd) => cmd.execute().await,
            Commands::Validate(cmd) => cmd.execute(),
        }
    }
}
