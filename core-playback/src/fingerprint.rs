//! # Fingerprint Engine
//!
//! Derives a content identity for a [`SourceDescriptor`] so the reuse path can
//! tell "same content through a different door" apart from "new content".
//!
//! ## Algorithm
//!
//! SHA-256 over a kind-specific domain prefix followed by:
//!
//! - **Local files**: the file size, then either the whole content (files up
//!   to [`FingerprintConfig::full_hash_limit_bytes`]) or evenly spaced sample
//!   blocks with their offsets. The locator is never hashed, so two paths to
//!   identical bytes produce the same fingerprint.
//! - **Remote nodes**: the node's content fingerprint, or else its size plus
//!   content checksum. The handle and the access mode (folder link or
//!   authenticated session) are never hashed.
//!
//! The domain prefix keeps local and remote fingerprints disjoint even for
//! identical inputs.

use crate::config::FingerprintConfig;
use crate::error::{PlaybackError, Result};
use crate::source::{SourceDescriptor, SourceKind};
use bridge_traits::{FileLocator, LocalFileAccessor, MediaNode};
use core_runtime::logging::strip_path;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

const LOCAL_DOMAIN: &[u8] = b"playback-fingerprint/local-file/v1\0";
const REMOTE_DOMAIN: &[u8] = b"playback-fingerprint/remote-node/v1\0";

/// Content identity of a source.
///
/// Only equality is meaningful. Fingerprints of different kinds never compare
/// equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    kind: SourceKind,
    digest: [u8; 32],
}

impl Fingerprint {
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Full lowercase hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.digest[..6])
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}:{})", self.kind, self.short())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Returns `true` only when both fingerprints exist and are equal.
///
/// A missing fingerprint never matches anything, including another missing one.
pub fn same_content(a: Option<&Fingerprint>, b: Option<&Fingerprint>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Computes fingerprints for source descriptors.
///
/// Cheap to clone; clones share the file accessor.
#[derive(Clone)]
pub struct FingerprintEngine {
    files: Arc<dyn LocalFileAccessor>,
    config: FingerprintConfig,
}

impl FingerprintEngine {
    /// Create an engine with the default [`FingerprintConfig`].
    pub fn new(files: Arc<dyn LocalFileAccessor>) -> Self {
        Self {
            files,
            config: FingerprintConfig::default(),
        }
    }

    /// Create an engine with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Internal`] if the configuration is invalid.
    pub fn with_config(files: Arc<dyn LocalFileAccessor>, config: FingerprintConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PlaybackError::Internal(format!("Invalid fingerprint config: {}", e)))?;

        Ok(Self { files, config })
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Fingerprint a descriptor, or `None` when no identity can be derived.
    pub fn fingerprint(&self, descriptor: &SourceDescriptor) -> Option<Fingerprint> {
        match self.try_fingerprint(descriptor) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                debug!(kind = %descriptor.kind(), error = %e, "No fingerprint for source");
                None
            }
        }
    }

    /// Fingerprint a descriptor, reporting why none could be derived.
    pub fn try_fingerprint(&self, descriptor: &SourceDescriptor) -> Result<Fingerprint> {
        match descriptor {
            SourceDescriptor::LocalFile { locator } => self.local_file(locator),
            SourceDescriptor::RemoteNode { node, .. } => remote_node(node),
        }
    }

    fn local_file(&self, locator: &FileLocator) -> Result<Fingerprint> {
        let metadata = self.files.metadata(locator)?;
        if metadata.is_directory {
            return Err(PlaybackError::FingerprintUnavailable(format!(
                "{} is a directory",
                strip_path(locator.as_str())
            )));
        }

        let size = metadata.size;
        let mut hasher = Sha256::new();
        hasher.update(LOCAL_DOMAIN);
        hasher.update(size.to_le_bytes());

        if size <= self.config.full_hash_limit_bytes {
            let len = usize::try_from(size)
                .map_err(|_| PlaybackError::Internal("file size exceeds address space".into()))?;
            let content = self.files.read_range(locator, 0, len)?;
            if content.len() != len {
                return Err(PlaybackError::FingerprintUnavailable(format!(
                    "{} changed while reading",
                    strip_path(locator.as_str())
                )));
            }
            hasher.update(b"full");
            hasher.update(&content);
        } else {
            hasher.update(b"sampled");
            for offset in sample_offsets(size, &self.config) {
                let block = self
                    .files
                    .read_range(locator, offset, self.config.sample_block_bytes)?;
                if block.len() != self.config.sample_block_bytes {
                    return Err(PlaybackError::FingerprintUnavailable(format!(
                        "{} changed while reading",
                        strip_path(locator.as_str())
                    )));
                }
                hasher.update(offset.to_le_bytes());
                hasher.update(&block);
            }
        }

        let fingerprint = Fingerprint {
            kind: SourceKind::LocalFile,
            digest: hasher.finalize().into(),
        };
        trace!(
            file = %strip_path(locator.as_str()),
            size,
            fingerprint = %fingerprint.short(),
            "Fingerprinted local file"
        );
        Ok(fingerprint)
    }
}

impl fmt::Debug for FingerprintEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintEngine")
            .field("files", &"LocalFileAccessor { ... }")
            .field("config", &self.config)
            .finish()
    }
}

fn remote_node(node: &MediaNode) -> Result<Fingerprint> {
    let mut hasher = Sha256::new();
    hasher.update(REMOTE_DOMAIN);

    match (node.content_fingerprint.as_deref(), node.size, node.checksum.as_deref()) {
        (Some(content), _, _) if !content.is_empty() => {
            hasher.update(b"content");
            hasher.update(content.as_bytes());
        }
        (_, Some(size), Some(checksum)) if !checksum.is_empty() => {
            hasher.update(b"checksum");
            hasher.update(size.to_le_bytes());
            hasher.update(checksum.as_bytes());
        }
        _ => {
            return Err(PlaybackError::FingerprintUnavailable(format!(
                "node {} has neither a content fingerprint nor size and checksum",
                node.handle
            )))
        }
    }

    Ok(Fingerprint {
        kind: SourceKind::RemoteNode,
        digest: hasher.finalize().into(),
    })
}

/// Offsets of the sampled blocks, evenly spaced from the start of the file to
/// the start of its last full block.
fn sample_offsets(size: u64, config: &FingerprintConfig) -> Vec<u64> {
    let block = config.sample_block_bytes as u64;
    let last = size.saturating_sub(block);
    let blocks = config.sample_blocks as u64;

    if blocks <= 1 {
        return vec![0];
    }

    (0..blocks).map(|i| last * i / (blocks - 1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{InMemoryFileAccessor, NodeHandle};

    fn small_config() -> FingerprintConfig {
        FingerprintConfig {
            full_hash_limit_bytes: 64,
            sample_blocks: 4,
            sample_block_bytes: 8,
        }
    }

    #[test]
    fn test_sample_offsets_cover_first_and_last_block() {
        let offsets = sample_offsets(1000, &small_config());
        assert_eq!(offsets, vec![0, 330, 661, 992]);
    }

    #[test]
    fn test_single_sample_block() {
        let config = FingerprintConfig {
            sample_blocks: 1,
            ..small_config()
        };
        assert_eq!(sample_offsets(1000, &config), vec![0]);
    }

    #[test]
    fn test_same_content_helper() {
        let files = Arc::new(InMemoryFileAccessor::new());
        files.insert("/a", vec![1u8; 16]);
        let engine = FingerprintEngine::new(files);
        let fp = engine.fingerprint(&SourceDescriptor::local_file("/a"));

        assert!(fp.is_some());
        assert!(same_content(fp.as_ref(), fp.as_ref()));
        assert!(!same_content(None, None));
        assert!(!same_content(fp.as_ref(), None));
    }

    #[test]
    fn test_remote_fingerprint_prefers_content_fingerprint() {
        let a = MediaNode::new(NodeHandle(1), "a.mp4")
            .with_content_fingerprint("cfp-1")
            .with_size(10)
            .with_checksum("sum-a");
        let b = MediaNode::new(NodeHandle(2), "b.mp4")
            .with_content_fingerprint("cfp-1")
            .with_size(99)
            .with_checksum("sum-b");

        assert_eq!(remote_node(&a).unwrap(), remote_node(&b).unwrap());
    }

    #[test]
    fn test_remote_fingerprint_falls_back_to_checksum() {
        let a = MediaNode::new(NodeHandle(1), "a.mp4")
            .with_size(10)
            .with_checksum("sum");
        let b = MediaNode::new(NodeHandle(2), "a.mp4")
            .with_size(11)
            .with_checksum("sum");

        assert_ne!(remote_node(&a).unwrap(), remote_node(&b).unwrap());
    }

    #[test]
    fn test_remote_fingerprint_unavailable() {
        let bare = MediaNode::new(NodeHandle(1), "a.mp4").with_size(10);
        assert!(matches!(
            remote_node(&bare),
            Err(PlaybackError::FingerprintUnavailable(_))
        ));

        let empty = MediaNode::new(NodeHandle(1), "a.mp4").with_content_fingerprint("");
        assert!(remote_node(&empty).is_err());
    }

    #[test]
    fn test_hex_and_debug_rendering() {
        let node = MediaNode::new(NodeHandle(1), "a.mp4").with_content_fingerprint("cfp");
        let fp = remote_node(&node).unwrap();

        assert_eq!(fp.to_hex().len(), 64);
        assert_eq!(fp.short().len(), 12);
        assert!(fp.to_hex().starts_with(&fp.short()));
        assert_eq!(
            format!("{:?}", fp),
            format!("Fingerprint(remote_node:{})", fp.short())
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let files = Arc::new(InMemoryFileAccessor::new());
        let config = FingerprintConfig {
            sample_blocks: 0,
            ..Default::default()
        };
        assert!(FingerprintEngine::with_config(files, config).is_err());
    }
}
