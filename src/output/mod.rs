//! Result publication for CI consumption.
//!
//! Outputs are `name=value` lines appended to the file named by the
//! `GITHUB_OUTPUT` environment variable; downstream workflow steps read
//! them back as step outputs. Outside a runner the lines go to stdout.

use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::detect::DetectionResults;

/// Output name for the all-clean flag.
pub const ALL_CLEAN: &str = "all-clean";
/// Output name for the all-dirty flag.
pub const ALL_DIRTY: &str = "all-dirty";
/// Output name for the some-dirty flag.
pub const SOME_DIRTY: &str = "some-dirty";
/// Output name for the space-joined clean bit names.
pub const CLEAN_BITS: &str = "clean-bits";
/// Output name for the space-joined dirty bit names.
pub const DIRTY_BITS: &str = "dirty-bits";
/// Output name for the JSON results value.
pub const RESULTS: &str = "json-results";

/// Output names a bit may not be named after. Each bit gets its own
/// `name=clean|dirty` output, so a collision would overwrite a summary.
pub const RESERVED_NAMES: [&str; 6] = [
    ALL_CLEAN, ALL_DIRTY, SOME_DIRTY, CLEAN_BITS, DIRTY_BITS, RESULTS,
];

/// Destination for `name=value` output lines.
#[derive(Debug, Clone)]
pub enum OutputSink {
    /// Append to the runner-provided output file.
    File(PathBuf),
    /// Print to stdout (no runner present).
    Stdout,
}

impl OutputSink {
    /// Resolves the sink from the `GITHUB_OUTPUT` environment variable.
    pub fn from_env() -> Self {
        match env::var("GITHUB_OUTPUT") {
            Ok(path) if !path.is_empty() => Self::File(PathBuf::from(path)),
            _ => Self::Stdout,
        }
    }

    /// Emits one output value.
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        match self {
            Self::File(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| {
                        format!("failed to open output file {}", path.display())
                    })?;
                writeln!(file, "{name}={value}")
                    .with_context(|| format!("failed to write output {name}"))?;
            }
            Self::Stdout => println!("{name}={value}"),
        }
        Ok(())
    }
}

/// Publishes the detection results.
///
/// Matched files are included in the results file but stripped from the
/// `json-results` output value to keep it small.
pub fn write_results(
    sink: &OutputSink,
    results: &DetectionResults,
    results_file: Option<&Path>,
) -> Result<()> {
    sink.set_output(ALL_CLEAN, &results.all_clean.to_string())?;
    sink.set_output(ALL_DIRTY, &results.all_dirty.to_string())?;
    sink.set_output(SOME_DIRTY, &results.some_dirty.to_string())?;
    for bit in &results.clean_bits {
        sink.set_output(bit, "clean")?;
    }
    for bit in &results.dirty_bits {
        sink.set_output(bit, "dirty")?;
    }

    let clean_bits = results.clean_bits.join(" ");
    let dirty_bits = results.dirty_bits.join(" ");
    info!("Clean bits: {clean_bits}");
    info!("Dirty bits: {dirty_bits}");
    sink.set_output(CLEAN_BITS, &clean_bits)?;
    sink.set_output(DIRTY_BITS, &dirty_bits)?;

    if let Some(path) = results_file {
        let json = serde_json::to_string_pretty(results)
            .context("failed to serialize detection results")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        info!("Wrote results to {}", path.display());
    }

    let mut stripped = results.clone();
    for bit in stripped.bits.values_mut() {
        bit.matched_files = None;
    }
    let json = serde_json::to_string(&stripped)
        .context("failed to serialize detection results")?;
    sink.set_output(RESULTS, &json)?;

    Ok(())
}
