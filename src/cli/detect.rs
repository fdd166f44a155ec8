//! Detect command — runs the dirty-bit detection pipeline.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

use crate::detect::{self, DetectRequest, RuleSet};
use crate::event::EventDescriptor;
use crate::github::{rest, GithubClient, GithubError};
use crate::output::{self, OutputSink};

/// Detect command options.
///
/// Every flag has an environment fallback matching the CI runner's
/// conventions, so a workflow step can invoke the command with only
/// `--rules-file`.
#[derive(Parser)]
pub struct DetectCommand {
    /// API token (defaults to $GITHUB_TOKEN).
    #[arg(long)]
    pub token: Option<String>,

    /// Path to the YAML rules file.
    #[arg(long = "rules-file", value_name = "PATH")]
    pub rules_file: PathBuf,

    /// Optional path to write the full results snapshot to.
    #[arg(long = "results-file", value_name = "PATH")]
    pub results_file: Option<PathBuf>,

    /// Repository in {owner}/{repo} form (defaults to $GITHUB_REPOSITORY).
    #[arg(long)]
    pub repository: Option<String>,

    /// Explicit base commit; must be given together with --head.
    #[arg(long)]
    pub base: Option<String>,

    /// Explicit head commit; must be given together with --base.
    #[arg(long)]
    pub head: Option<String>,

    /// Triggering event name (defaults to $GITHUB_EVENT_NAME).
    #[arg(long = "event-name", value_name = "NAME")]
    pub event_name: Option<String>,

    /// Path to the event payload JSON (defaults to $GITHUB_EVENT_PATH).
    #[arg(long = "event-path", value_name = "PATH")]
    pub event_path: Option<PathBuf>,

    /// API base URL (defaults to $GITHUB_API_URL, then api.github.com).
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,
}

impl DetectCommand {
    /// Executes the detect command.
    pub async fn execute(self) -> Result<()> {
        let inputs = Inputs::resolve(self)?;
        let rules = RuleSet::load(&inputs.rules_file)?;
        let client = GithubClient::with_api_url(&inputs.api_url, inputs.token.clone())?;
        let request = inputs.to_request()?;

        let results = detect::detect(&client, &request, &rules).await?;

        let sink = OutputSink::from_env();
        output::write_results(&sink, &results, inputs.results_file.as_deref())?;
        Ok(())
    }
}

/// Validated inputs for one detection run.
struct Inputs {
    token: String,
    rules_file: PathBuf,
    results_file: Option<PathBuf>,
    owner: String,
    repo: String,
    base: Option<String>,
    head: Option<String>,
    event_name: Option<String>,
    event_path: Option<PathBuf>,
    api_url: String,
}

impl Inputs {
    /// Applies environment fallbacks and validates the combination.
    fn resolve(cmd: DetectCommand) -> Result<Self> {
        let token = cmd
            .token
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.is_empty())
            .ok_or(GithubError::TokenNotFound)?;

        let repository = cmd
            .repository
            .or_else(|| env::var("GITHUB_REPOSITORY").ok())
            .context("no repository given; pass --repository or set GITHUB_REPOSITORY")?;
        let (owner, repo) = split_repository(&repository)?;
        debug!("Repo: {owner}/{repo}");

        if cmd.base.is_some() != cmd.head.is_some() {
            bail!("base and head must be specified together");
        }
        if let (Some(base), Some(head)) = (&cmd.base, &cmd.head) {
            debug!("Commit range: {base}...{head}");
        }

        let event_name = cmd
            .event_name
            .or_else(|| env::var("GITHUB_EVENT_NAME").ok())
            .filter(|n| !n.is_empty());
        let event_path = cmd
            .event_path
            .or_else(|| env::var("GITHUB_EVENT_PATH").ok().map(PathBuf::from));
        let api_url = cmd
            .api_url
            .or_else(|| env::var("GITHUB_API_URL").ok())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| rest::DEFAULT_API_URL.to_string());

        Ok(Self {
            token,
            rules_file: cmd.rules_file,
            results_file: cmd.results_file,
            owner,
            repo,
            base: cmd.base,
            head: cmd.head,
            event_name,
            event_path,
            api_url,
        })
    }

    /// Builds the detection request, decoding the event payload only
    /// when no explicit range short-circuits it.
    fn to_request(&self) -> Result<DetectRequest> {
        let event = if self.base.is_some() && self.head.is_some() {
            None
        } else {
            let Some(name) = &self.event_name else {
                bail!(
                    "no commit range given and no event available; \
                     pass --base/--head or set GITHUB_EVENT_NAME"
                );
            };
            let Some(path) = &self.event_path else {
                bail!("no event payload available; pass --event-path or set GITHUB_EVENT_PATH");
            };
            Some(EventDescriptor::from_file(name, path)?)
        };

        Ok(DetectRequest {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            base: self.base.clone(),
            head: self.head.clone(),
            event,
        })
    }
}

fn split_repository(repository: &str) -> Result<(String, String)> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => bail!("invalid repository {repository}; expected format: {{owner}}/{{repo}}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Result<DetectCommand> {
        let mut argv = vec!["detect"];
        argv.extend_from_slice(args);
        DetectCommand::try_parse_from(argv).context("argument parsing failed")
    }

    #[test]
    fn repository_splits_into_owner_and_repo() -> Result<()> {
        assert_eq!(
            split_repository("octo/mono")?,
            ("octo".to_string(), "mono".to_string())
        );
        Ok(())
    }

    #[test]
    fn malformed_repository_is_rejected() {
        for bad in ["octo", "octo/", "/mono", "octo/mono/extra", ""] {
            assert!(split_repository(bad).is_err(), "{bad:?} must be rejected");
        }
    }

    #[test]
    fn base_without_head_is_rejected() -> Result<()> {
        let cmd = command(&[
            "--rules-file",
            "rules.yml",
            "--token",
            "t",
            "--repository",
            "octo/mono",
            "--base",
            "aaa",
        ])?;
        let err = Inputs::resolve(cmd).err().map(|e| e.to_string());
        assert_eq!(
            err,
            Some("base and head must be specified together".to_string())
        );
        Ok(())
    }

    #[test]
    fn explicit_range_needs_no_event() -> Result<()> {
        let cmd = command(&[
            "--rules-file",
            "rules.yml",
            "--token",
            "t",
            "--repository",
            "octo/mono",
            "--base",
            "aaa",
            "--head",
            "bbb",
        ])?;
        let inputs = Inputs::resolve(cmd)?;
        let request = inputs.to_request()?;
        assert_eq!(request.base.as_deref(), Some("aaa"));
        assert_eq!(request.head.as_deref(), Some("bbb"));
        assert_eq!(request.event, None);
        Ok(())
    }

    #[test]
    fn event_name_without_payload_path_is_rejected() -> Result<()> {
        let cmd = command(&[
            "--rules-file",
            "rules.yml",
            "--token",
            "t",
            "--repository",
            "octo/mono",
            "--event-name",
            "push",
        ])?;
        let inputs = Inputs::resolve(cmd)?;
        // The runner env may still provide GITHUB_EVENT_PATH; only a
        // fully absent payload path is an error.
        if inputs.event_path.is_none() {
            assert!(inputs.to_request().is_err());
        }
        Ok(())
    }
}
