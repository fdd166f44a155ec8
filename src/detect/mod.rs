//! The dirty-bit detection pipeline.
//!
//! One run is strictly sequential: resolve the commit range, collect
//! the changed files, match patterns, assemble results. Any stage may
//! mark the run all-dirty with a reason; later stages then become
//! no-ops and result assembly forces every configured bit dirty. The
//! fail-safe is a policy branch, not an error: incomplete change
//! information over-triggers downstream work instead of skipping it.

pub mod changes;
pub mod error;
pub mod matcher;
pub mod range;
pub mod results;
pub mod rules;

use anyhow::Result;
use tracing::info;

use crate::event::EventDescriptor;
use crate::github::SourceControlClient;

pub use changes::{ChangedFile, NULL_COMMIT};
pub use error::DetectError;
pub use matcher::Pattern;
pub use results::{BitResult, DetectionResults};
pub use rules::{BitRule, RuleSet};

/// One detection run's inputs.
#[derive(Debug, Clone, Default)]
pub struct DetectRequest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Explicit base commit, overriding event resolution.
    pub base: Option<String>,
    /// Explicit head commit, overriding event resolution.
    pub head: Option<String>,
    /// Decoded triggering event, consulted when no explicit range is
    /// given.
    pub event: Option<EventDescriptor>,
}

/// Mutable state threaded through one detection run.
///
/// Each run gets its own context; nothing is shared across runs. The
/// all-dirty flag is one-way: once set it is never cleared, and the
/// reason survives into the final results.
#[derive(Debug, Default)]
pub struct DetectionContext {
    /// Base commit of the effective range.
    pub base: String,
    /// Head commit of the effective range.
    pub head: String,
    /// Human-facing compare URL, filled in by the collector.
    pub compare_url: String,
    all_dirty: Option<String>,
}

impl DetectionContext {
    /// Creates a fresh context for one run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every bit dirty, recording a reason for operator
    /// visibility. The first reason wins.
    pub fn mark_all_dirty(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        info!("Marking all repo bits dirty: {reason}");
        if self.all_dirty.is_none() {
            self.all_dirty = Some(reason);
        }
    }

    /// Whether the fail-safe has fired.
    pub fn is_all_dirty(&self) -> bool {
        self.all_dirty.is_some()
    }

    /// The fail-safe reason, if it fired.
    pub fn all_dirty_reason(&self) -> Option<&str> {
        self.all_dirty.as_deref()
    }
}

/// Runs the full detection pipeline against a rule set.
pub async fn detect(
    client: &dyn SourceControlClient,
    request: &DetectRequest,
    rules: &RuleSet,
) -> Result<DetectionResults> {
    let mut ctx = DetectionContext::new();
    range::resolve_range(&mut ctx, client, request).await?;
    let changed_files =
        changes::collect_changed_files(&mut ctx, client, &request.owner, &request.repo).await?;
    let matched = matcher::match_rules(&ctx, rules, &changed_files);
    Ok(results::assemble(rules, ctx, matched))
}

#[cfg(test)]
pub(crate) mod test_support;
