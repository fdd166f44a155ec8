//! Changed-file collection over the compare API.

use anyhow::Result;
use tracing::{debug, info};

use crate::detect::DetectionContext;
use crate::github::{DiffEntry, SourceControlClient};

/// The all-zero sha a push event reports when a ref was created or
/// deleted. The compare API cannot diff against it.
pub const NULL_COMMIT: &str = "0000000000000000000000000000000000000000";

/// A single changed file extracted from a comparison.
///
/// `previous_filename` and `current_filename` are mutually exclusive:
/// a rename produces two records, one carrying each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Path the pattern rules are matched against.
    pub filename: String,
    /// Change status reported by the API.
    pub status: String,
    /// Blob sha of the file.
    pub sha: String,
    /// Old path of a renamed file, set on the primary rename record.
    pub previous_filename: Option<String>,
    /// New path of a renamed file, set on the synthetic rename record.
    pub current_filename: Option<String>,
}

/// Extracts the relevant properties of a diff entry.
fn extract(entry: &DiffEntry) -> ChangedFile {
    ChangedFile {
        filename: entry.filename.clone(),
        status: entry.status.clone(),
        sha: entry.sha.clone(),
        previous_filename: if entry.status == "renamed" {
            entry.previous_filename.clone()
        } else {
            None
        },
        current_filename: None,
    }
}

/// Re-keys a renamed entry under its old path so rules owning the old
/// location see the change; the new path moves to `current_filename`.
fn extract_renamed(entry: &DiffEntry) -> ChangedFile {
    ChangedFile {
        filename: entry.previous_filename.clone().unwrap_or_default(),
        status: entry.status.clone(),
        sha: entry.sha.clone(),
        previous_filename: None,
        current_filename: Some(entry.filename.clone()),
    }
}

/// Fetches the files changed between the context's base and head.
///
/// Returns an empty list without calling the API when the fail-safe
/// already fired, and fires it itself on a null commit or a truncated
/// comparison response.
pub async fn collect_changed_files(
    ctx: &mut DetectionContext,
    client: &dyn SourceControlClient,
    owner: &str,
    repo: &str,
) -> Result<Vec<ChangedFile>> {
    if ctx.is_all_dirty() {
        return Ok(Vec::new());
    }

    info!("Comparing {}...{}", ctx.base, ctx.head);
    if ctx.base == NULL_COMMIT || ctx.head == NULL_COMMIT {
        ctx.mark_all_dirty(format!("null commit ({NULL_COMMIT}) found"));
        return Ok(Vec::new());
    }

    let comparison = client
        .compare_commits(owner, repo, &ctx.base, &ctx.head)
        .await?;
    ctx.compare_url = comparison.html_url;

    let num_commits = comparison.commits.len() as u64;
    if num_commits < comparison.total_commits {
        // The response page cannot cover the range, so the file list is
        // incomplete and untrustworthy.
        ctx.mark_all_dirty(format!(
            "{}...{} includes {} commits (max {num_commits})",
            ctx.base, ctx.head, comparison.total_commits
        ));
        return Ok(Vec::new());
    }

    let mut changed_files: Vec<ChangedFile> = comparison.files.iter().map(extract).collect();
    // Append the previous filename of each renamed file so rules owning
    // the old location are matched too.
    let previous_files: Vec<ChangedFile> = comparison
        .files
        .iter()
        .filter(|f| f.status == "renamed")
        .map(extract_renamed)
        .collect();
    changed_files.extend(previous_files);

    for file in &changed_files {
        debug!("Changed file: {}", file.filename);
    }
    Ok(changed_files)
}
