//! Shared test utilities for the `detect` module.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};

use crate::github::{Comparison, Release, SourceControlClient};

/// Mock source-control client with pre-programmed responses.
///
/// Endpoints without a programmed response return an error, standing
/// in for an API failure. Call counts are recorded so tests can assert
/// which endpoints were (or were not) consulted.
pub(crate) struct MockClient {
    releases: Option<Vec<Release>>,
    comparison: Option<Comparison>,
    release_calls: AtomicUsize,
    compare_calls: AtomicUsize,
}

impl MockClient {
    /// Creates a mock with no programmed responses.
    pub(crate) fn new() -> Self {
        Self {
            releases: None,
            comparison: None,
            release_calls: AtomicUsize::new(0),
            compare_calls: AtomicUsize::new(0),
        }
    }

    /// Programs the release listing response.
    pub(crate) fn with_releases(mut self, releases: Vec<Release>) -> Self {
        self.releases = Some(releases);
        self
    }

    /// Programs the comparison response.
    pub(crate) fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    /// Number of `list_releases` calls observed.
    pub(crate) fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// Number of `compare_commits` calls observed.
    pub(crate) fn compare_calls(&self) -> usize {
        self.compare_calls.load(Ordering::SeqCst)
    }
}

impl SourceControlClient for MockClient {
    fn list_releases<'a>(
        &'a self,
        _owner: &'a str,
        _repo: &'a str,
        _per_page: u8,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + 'a>> {
        Box::pin(async move {
            self.release_calls.fetch_add(1, Ordering::SeqCst);
            self.releases
                .clone()
                .ok_or_else(|| anyhow!("no mock release response programmed"))
        })
    }

    fn compare_commits<'a>(
        &'a self,
        _owner: &'a str,
        _repo: &'a str,
        _base: &'a str,
        _head: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Comparison>> + Send + 'a>> {
        Box::pin(async move {
            self.compare_calls.fetch_add(1, Ordering::SeqCst);
            self.comparison
                .clone()
                .ok_or_else(|| anyhow!("no mock comparison response programmed"))
        })
    }
}
