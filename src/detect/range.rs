//! Commit range resolution from explicit inputs or the triggering event.

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::detect::{DetectError, DetectRequest, DetectionContext};
use crate::event::EventDescriptor;
use crate::github::SourceControlClient;

/// Releases fetched when looking up the previous release. The previous
/// published release is expected within the newest page.
const RELEASE_PAGE_SIZE: u8 = 10;

/// Finds the tag of the published release preceding `release`.
///
/// Drafts and prereleases do not count. Returns `None` after marking
/// the run all-dirty when fewer than two published releases exist.
async fn find_previous_release(
    ctx: &mut DetectionContext,
    client: &dyn SourceControlClient,
    owner: &str,
    repo: &str,
    release: &str,
) -> Result<Option<String>> {
    let releases: Vec<String> = client
        .list_releases(owner, repo, RELEASE_PAGE_SIZE)
        .await?
        .into_iter()
        .filter(|r| !r.draft && !r.prerelease)
        .map(|r| r.tag_name)
        .collect();
    debug!("Found {} published releases", releases.len());

    if releases.len() < 2 {
        ctx.mark_all_dirty("unable to find previous release");
        return Ok(None);
    }
    if releases[0] != release {
        // The listing is stale or the event arrived out of order;
        // diffing against an arbitrary release would misclassify.
        return Err(DetectError::InconsistentReleaseOrder {
            latest: releases[0].clone(),
            event: release.to_string(),
        }
        .into());
    }
    Ok(Some(releases[1].clone()))
}

/// Resolves the commit range into the context.
///
/// An explicit base and head pair short-circuits event inspection
/// entirely; otherwise the range is derived from the event kind.
pub async fn resolve_range(
    ctx: &mut DetectionContext,
    client: &dyn SourceControlClient,
    request: &DetectRequest,
) -> Result<()> {
    if let (Some(base), Some(head)) = (&request.base, &request.head) {
        ctx.base = base.clone();
        ctx.head = head.clone();
        debug!("Commit range from inputs: {base}...{head}");
        return Ok(());
    }

    let Some(event) = &request.event else {
        bail!("no commit range given and no event payload available");
    };
    match event {
        EventDescriptor::PullRequest {
            number,
            base_sha,
            head_sha,
        } => {
            info!("Event: pull request #{number}");
            ctx.base = base_sha.clone();
            ctx.head = head_sha.clone();
        }
        EventDescriptor::Push {
            git_ref,
            before,
            after,
        } => {
            info!("Event: push {git_ref}");
            ctx.base = before.clone();
            ctx.head = after.clone();
        }
        EventDescriptor::Release { tag } => {
            info!("Event: release tag {tag}");
            let previous =
                find_previous_release(ctx, client, &request.owner, &request.repo, tag)
                    .await?
                    .unwrap_or_default();
            info!("Previous release tag {previous}");
            ctx.base = previous;
            ctx.head = tag.clone();
        }
        EventDescriptor::ManualDispatch {
            workflow,
            base,
            head,
        } => {
            info!("Event: workflow dispatch {workflow}");
            ctx.base = base.clone();
            ctx.head = head.clone();
            info!("Commit range from workflow inputs: {base}...{head}");
        }
    }
    Ok(())
}
