//! Detection-specific error handling.

use thiserror::Error;

/// Fatal detection errors.
///
/// Fail-safe conditions (missing previous release, null commit,
/// truncated comparison) are deliberately not errors; they complete the
/// run with every bit marked dirty instead.
#[derive(Error, Debug)]
pub enum DetectError {
    /// The rules source is malformed or violates a load-time invariant.
    #[error("invalid rules file: {0}")]
    Config(String),

    /// The triggering event is not one detection knows how to handle.
    #[error("unsupported event type \"{0}\"")]
    UnsupportedEvent(String),

    /// The release listing disagrees with the triggering release event,
    /// meaning the list is stale or the event arrived out of order.
    #[error("latest published release {latest} does not match event release {event}")]
    InconsistentReleaseOrder {
        /// Newest published release tag from the listing.
        latest: String,
        /// Tag carried by the triggering event.
        event: String,
    },
}

// Note: anyhow already has a blanket impl for thiserror::Error types
