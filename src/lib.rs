//! # dirty-bits
//!
//! Dirty-bit detection for monorepo CI pipelines.
//!
//! Given a triggering event (or an explicit commit range), dirty-bits
//! lists the files changed across the range and matches them against a
//! set of named pattern rules, classifying each configured "bit" of the
//! repository as dirty (affected) or clean. Downstream pipeline stages
//! read the classification to skip work on unaffected subsystems.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod detect;
pub mod event;
pub mod github;
pub mod output;

pub use crate::cli::Cli;

/// The current version of dirty-bits.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
