//! GitHub REST client implementation.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::github::{Comparison, GithubError, Release, SourceControlClient};

/// Default API base URL for github.com.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub REST API client.
pub struct GithubClient {
    /// HTTP client for API requests
    client: Client,
    /// API token for authentication
    token: String,
    /// Base URL of the REST API, without a trailing slash
    api_base: String,
}

impl GithubClient {
    /// Create a client against api.github.com.
    pub fn new(token: String) -> Result<Self> {
        Self::with_api_url(DEFAULT_API_URL, token)
    }

    /// Create a client against a specific API base URL (e.g. a GitHub
    /// Enterprise `/api/v3` endpoint).
    pub fn with_api_url(api_url: &str, token: String) -> Result<Self> {
        let parsed =
            Url::parse(api_url).map_err(|e| GithubError::InvalidApiUrl(format!("{api_url}: {e}")))?;

        Ok(Self {
            client: Client::new(),
            token,
            api_base: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Send a GET request and decode the JSON response body.
    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("authorization", format!("Bearer {}", self.token))
            .header("accept", "application/vnd.github+json")
            .header("x-github-api-version", "2022-11-28")
            .header("user-agent", concat!("dirty-bits/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(|e| GithubError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(
                GithubError::ApiRequestFailed(format!("HTTP {status}: {error_text}")).into(),
            );
        }

        response
            .json()
            .await
            .map_err(|e| GithubError::InvalidResponseFormat(e.to_string()).into())
    }
}

impl SourceControlClient for GithubClient {
    fn list_releases<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        per_page: u8,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + 'a>> {
        // https://docs.github.com/en/rest/releases/releases#list-releases
        Box::pin(async move {
            let url = format!(
                "{}/repos/{owner}/{repo}/releases?per_page={per_page}",
                self.api_base
            );
            self.get_json(url).await
        })
    }

    fn compare_commits<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        base: &'a str,
        head: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Comparison>> + Send + 'a>> {
        // https://docs.github.com/en/rest/commits/commits#compare-two-commits
        Box::pin(async move {
            let url = format!(
                "{}/repos/{owner}/{repo}/compare/{base}...{head}",
                self.api_base
            );
            self.get_json(url).await
        })
    }
}
