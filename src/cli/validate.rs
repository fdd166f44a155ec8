//! Validate command — checks a rules file without touching the network.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::detect::RuleSet;

/// Validate command options.
#[derive(Parser)]
pub struct ValidateCommand {
    /// Path to the YAML rules file.
    #[arg(long = "rules-file", value_name = "PATH")]
    pub rules_file: PathBuf,
}

impl ValidateCommand {
    /// Executes the validate command.
    pub fn execute(self) -> Result<()> {
        let rules = RuleSet::load(&self.rules_file)?;
        println!(
            "{}: OK ({} bits configured)",
            self.rules_file.display(),
            rules.len()
        );
        for bit in rules.bits() {
            println!("  {} ({} patterns)", bit.name, bit.patterns.len());
        }
        Ok(())
    }
}
