//! Error types shared by the fetch queue, the client and the page parsers.

use thiserror::Error;

/// Failures that can surface while acquiring or reshaping upstream content.
#[derive(Debug, Error)]
pub enum HnError {
    /// Every fetch attempt for the item failed, or upstream reported it
    /// as nonexistent.
    #[error("item {0} does not exist")]
    ItemNotFound(u64),

    /// Upstream has no record of the requested user.
    #[error("user {0} does not exist")]
    UserNotFound(String),

    /// A scraped page or reconstruction input violated its expected shape.
    #[error("malformed upstream content: {0}")]
    MalformedUpstream(String),

    /// Network or body-decoding failure on a single request.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },
}
