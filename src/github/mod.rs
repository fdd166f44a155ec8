//! GitHub REST API access for release listing and commit comparison.

pub mod rest;

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use serde::Deserialize;
use thiserror::Error;

pub use rest::GithubClient;

/// GitHub API specific errors.
#[derive(Error, Debug)]
pub enum GithubError {
    /// API token not found in inputs or environment variables.
    #[error("GitHub token not found. Pass --token or set the GITHUB_TOKEN environment variable")]
    TokenNotFound,

    /// The API base URL could not be parsed.
    #[error("Invalid API base URL: {0}")]
    InvalidApiUrl(String),

    /// GitHub API request failed with error message.
    #[error("GitHub API request failed: {0}")]
    ApiRequestFailed(String),

    /// Invalid response format from the GitHub API.
    #[error("Invalid response format from GitHub API: {0}")]
    InvalidResponseFormat(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}

// Note: anyhow already has a blanket impl for thiserror::Error types

/// A release as returned by the list-releases endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Tag the release points at.
    pub tag_name: String,
    /// Whether the release is an unpublished draft.
    #[serde(default)]
    pub draft: bool,
    /// Whether the release is marked as a prerelease.
    #[serde(default)]
    pub prerelease: bool,
}

/// One commit of a comparison response, reduced to its identity.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    /// Full commit sha.
    pub sha: String,
}

/// One file entry of a comparison response.
#[derive(Debug, Clone, Deserialize)]
pub struct DiffEntry {
    /// Path of the file at the head commit.
    pub filename: String,
    /// Change status reported by the API ("added", "modified", "renamed", ...).
    pub status: String,
    /// Blob sha of the file at head.
    pub sha: String,
    /// Path before a rename; only present when status is "renamed".
    #[serde(default)]
    pub previous_filename: Option<String>,
}

/// Compare-two-commits response, reduced to the fields detection consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct Comparison {
    /// Human-facing compare URL for the range.
    pub html_url: String,
    /// Commits included in this response.
    #[serde(default)]
    pub commits: Vec<CommitRef>,
    /// Total number of commits in the range. The API caps `commits`, so
    /// this can exceed `commits.len()` on large ranges.
    pub total_commits: u64,
    /// Files changed across the range.
    #[serde(default)]
    pub files: Vec<DiffEntry>,
}

/// Trait for source-control API clients.
pub trait SourceControlClient: Send + Sync {
    /// List releases for a repository, newest first.
    fn list_releases<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        per_page: u8,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + 'a>>;

    /// Compare two commits and return the diff summary for the range.
    fn compare_commits<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        base: &'a str,
        head: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Comparison>> + Send + 'a>>;
}
