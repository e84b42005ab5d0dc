//! # Source Descriptors
//!
//! What a playback context plays: a local file, or a remote node reached
//! through a streaming client.

use bridge_traits::{FileLocator, MediaNode, StreamingClient};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The two mutually exclusive origins a context can be bound to.
///
/// Fixed when a context is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    LocalFile,
    RemoteNode,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::LocalFile => "local_file",
            SourceKind::RemoteNode => "remote_node",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a remote node is reached.
///
/// The folder-link flag and the client are only ever set together.
#[derive(Clone)]
pub struct StreamingAccess {
    client: Arc<dyn StreamingClient>,
    is_folder_link: bool,
}

impl StreamingAccess {
    pub fn new(client: Arc<dyn StreamingClient>, is_folder_link: bool) -> Self {
        Self {
            client,
            is_folder_link,
        }
    }

    pub fn client(&self) -> &Arc<dyn StreamingClient> {
        &self.client
    }

    pub fn is_folder_link(&self) -> bool {
        self.is_folder_link
    }
}

impl fmt::Debug for StreamingAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingAccess")
            .field("client", &self.client.name())
            .field("is_folder_link", &self.is_folder_link)
            .finish()
    }
}

/// What to play.
#[derive(Debug, Clone)]
pub enum SourceDescriptor {
    LocalFile {
        locator: FileLocator,
    },
    RemoteNode {
        node: MediaNode,
        access: StreamingAccess,
    },
}

impl SourceDescriptor {
    pub fn local_file(locator: impl Into<FileLocator>) -> Self {
        SourceDescriptor::LocalFile {
            locator: locator.into(),
        }
    }

    pub fn remote_node(
        node: MediaNode,
        is_folder_link: bool,
        client: Arc<dyn StreamingClient>,
    ) -> Self {
        SourceDescriptor::RemoteNode {
            node,
            access: StreamingAccess::new(client, is_folder_link),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::LocalFile { .. } => SourceKind::LocalFile,
            SourceDescriptor::RemoteNode { .. } => SourceKind::RemoteNode,
        }
    }

    pub fn locator(&self) -> Option<&FileLocator> {
        match self {
            SourceDescriptor::LocalFile { locator } => Some(locator),
            SourceDescriptor::RemoteNode { .. } => None,
        }
    }

    pub fn node(&self) -> Option<&MediaNode> {
        match self {
            SourceDescriptor::RemoteNode { node, .. } => Some(node),
            SourceDescriptor::LocalFile { .. } => None,
        }
    }

    pub fn access(&self) -> Option<&StreamingAccess> {
        match self {
            SourceDescriptor::RemoteNode { access, .. } => Some(access),
            SourceDescriptor::LocalFile { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{NodeHandle, PlayableUrl};

    struct NamedClient;

    #[async_trait]
    impl StreamingClient for NamedClient {
        async fn resolve_playable_url(
            &self,
            _node: &MediaNode,
            _is_folder_link: bool,
        ) -> BridgeResult<PlayableUrl> {
            Ok(PlayableUrl::new("http://127.0.0.1/stream"))
        }

        fn name(&self) -> &str {
            "named-client"
        }
    }

    #[test]
    fn test_descriptor_kinds() {
        let file = SourceDescriptor::local_file("/media/clip.mp4");
        assert_eq!(file.kind(), SourceKind::LocalFile);
        assert_eq!(file.locator().map(|l| l.as_str()), Some("/media/clip.mp4"));
        assert!(file.node().is_none());
        assert!(file.access().is_none());

        let node = SourceDescriptor::remote_node(
            MediaNode::new(NodeHandle(7), "clip.mp4"),
            true,
            Arc::new(NamedClient),
        );
        assert_eq!(node.kind(), SourceKind::RemoteNode);
        assert_eq!(node.node().map(|n| n.handle), Some(NodeHandle(7)));
        assert!(node.access().is_some_and(|a| a.is_folder_link()));
        assert!(node.locator().is_none());
    }

    #[test]
    fn test_access_debug_names_client() {
        let access = StreamingAccess::new(Arc::new(NamedClient), false);
        let debug = format!("{:?}", access);

        assert!(debug.contains("named-client"));
        assert!(debug.contains("is_folder_link: false"));
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&SourceKind::RemoteNode).unwrap();
        assert_eq!(json, "\"remote_node\"");
    }
}
