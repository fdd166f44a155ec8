//! Triggering-event decoding.
//!
//! CI runners deliver the webhook payload as a JSON file plus an event
//! name. Each supported event kind carries different fields; decoding
//! happens once, at the entry point, into a variant holding only the
//! fields that kind guarantees.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::detect::DetectError;

/// The triggering event, reduced to the fields detection consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDescriptor {
    /// A pull request was opened or updated.
    PullRequest {
        /// Pull request number.
        number: u64,
        /// Tip of the target branch at event time.
        base_sha: String,
        /// Tip of the source branch at event time.
        head_sha: String,
    },
    /// Commits were pushed to a ref.
    Push {
        /// The ref that was pushed to.
        git_ref: String,
        /// Commit the ref pointed at before the push.
        before: String,
        /// Commit the ref points at after the push.
        after: String,
    },
    /// A release was published.
    Release {
        /// Tag of the triggering release.
        tag: String,
    },
    /// A workflow was dispatched manually with an explicit range.
    ManualDispatch {
        /// Name of the dispatched workflow.
        workflow: String,
        /// Base commit from the workflow inputs.
        base: String,
        /// Head commit from the workflow inputs.
        head: String,
    },
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: u64,
    pull_request: PullRequestRefs,
}

#[derive(Deserialize)]
struct PullRequestRefs {
    base: CommitPointer,
    head: CommitPointer,
}

#[derive(Deserialize)]
struct CommitPointer {
    sha: String,
}

#[derive(Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    before: String,
    after: String,
}

#[derive(Deserialize)]
struct ReleasePayload {
    release: ReleaseRef,
}

#[derive(Deserialize)]
struct ReleaseRef {
    tag_name: String,
}

#[derive(Deserialize)]
struct DispatchPayload {
    workflow: String,
    inputs: DispatchInputs,
}

#[derive(Deserialize)]
struct DispatchInputs {
    base: String,
    head: String,
}

impl EventDescriptor {
    /// Decodes a payload, dispatching on the event name.
    ///
    /// An event name outside the supported set is fatal.
    pub fn from_payload(event_name: &str, payload: &str) -> Result<Self> {
        match event_name {
            "pull_request" => {
                let p: PullRequestPayload = serde_json::from_str(payload)
                    .context("malformed pull_request event payload")?;
                Ok(Self::PullRequest {
                    number: p.number,
                    base_sha: p.pull_request.base.sha,
                    head_sha: p.pull_request.head.sha,
                })
            }
            "push" => {
                let p: PushPayload =
                    serde_json::from_str(payload).context("malformed push event payload")?;
                Ok(Self::Push {
                    git_ref: p.git_ref,
                    before: p.before,
                    after: p.after,
                })
            }
            "release" => {
                let p: ReleasePayload =
                    serde_json::from_str(payload).context("malformed release event payload")?;
                Ok(Self::Release {
                    tag: p.release.tag_name,
                })
            }
            "workflow_dispatch" => {
                let p: DispatchPayload = serde_json::from_str(payload)
                    .context("malformed workflow_dispatch event payload")?;
                Ok(Self::ManualDispatch {
                    workflow: p.workflow,
                    base: p.inputs.base,
                    head: p.inputs.head,
                })
            }
            other => Err(DetectError::UnsupportedEvent(other.to_string()).into()),
        }
    }

    /// Reads and decodes the payload file the CI runner wrote.
    pub fn from_file(event_name: &str, path: &Path) -> Result<Self> {
        let payload = fs::read_to_string(path)
            .with_context(|| format!("failed to read event payload {}", path.display()))?;
        Self::from_payload(event_name, &payload)
    }
}
