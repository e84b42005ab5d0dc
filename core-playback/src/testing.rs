//! Test doubles shared by unit tests.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::{MediaNode, PlayableUrl, StreamingClient};

/// Resolves every node to a fixed local URL.
pub(crate) struct NoopClient;

#[async_trait]
impl StreamingClient for NoopClient {
    async fn resolve_playable_url(
        &self,
        node: &MediaNode,
        _is_folder_link: bool,
    ) -> Result<PlayableUrl> {
        Ok(PlayableUrl::new(format!(
            "http://127.0.0.1:4443/stream/{}",
            node.handle
        )))
    }
}
