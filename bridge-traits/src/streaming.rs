//! Streaming Client Abstraction
//!
//! The streaming client turns a remote [`MediaNode`] into something the host's
//! playback engine can open. The core only ever reads through this trait; the
//! client's lifecycle (login, logout, teardown) belongs to the host.

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;
use crate::media::MediaNode;

/// A URL the host playback engine can open directly.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PlayableUrl(String);

impl PlayableUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL with the query string and fragment removed, safe to log.
    pub fn redacted(&self) -> &str {
        let end = self.0.find(|c: char| c == '?' || c == '#').unwrap_or(self.0.len());
        &self.0[..end]
    }
}

// Folder-link URLs carry the link key in the query; keep it out of Debug output.
impl fmt::Debug for PlayableUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlayableUrl").field(&self.redacted()).finish()
    }
}

impl fmt::Display for PlayableUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.redacted())
    }
}

/// Streaming client trait
///
/// Resolves remote nodes to playable URLs. `is_folder_link` selects whether
/// the node is reached through a public folder link or the authenticated
/// session; it changes how the URL is built, not what content it serves.
///
/// Implementations own their request timeouts.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::streaming::StreamingClient;
///
/// async fn open(client: &dyn StreamingClient, node: &MediaNode) -> Result<()> {
///     let url = client.resolve_playable_url(node, false).await?;
///     client.warm_up(&url).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait StreamingClient: Send + Sync {
    /// Resolve a node to a URL the playback engine can open.
    async fn resolve_playable_url(&self, node: &MediaNode, is_folder_link: bool)
        -> Result<PlayableUrl>;

    /// Prime whatever the client caches for this URL ahead of playback.
    ///
    /// The default does nothing; resolving the URL is the whole warm-up.
    async fn warm_up(&self, _url: &PlayableUrl) -> Result<()> {
        Ok(())
    }

    /// Short identifier used in logs.
    fn name(&self) -> &str {
        "streaming-client"
    }
}
