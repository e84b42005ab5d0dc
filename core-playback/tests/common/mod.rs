//! Shared fixtures for core-playback integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{InMemoryFileAccessor, MediaNode, NodeHandle, PlayableUrl, StreamingClient};
use core_async::sync::Semaphore;
use core_playback::FingerprintEngine;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Streaming client whose `resolve_playable_url` can be held until released.
pub struct GatedClient {
    gate: Option<Semaphore>,
    fail: AtomicBool,
    resolves: AtomicUsize,
    warm_ups: AtomicUsize,
}

impl GatedClient {
    /// Resolves immediately.
    pub fn open() -> Arc<Self> {
        Arc::new(Self::with_gate(None))
    }

    /// Every resolve waits for one [`release`](Self::release).
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::with_gate(Some(Semaphore::new(0))))
    }

    fn with_gate(gate: Option<Semaphore>) -> Self {
        Self {
            gate,
            fail: AtomicBool::new(false),
            resolves: AtomicUsize::new(0),
            warm_ups: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, jobs: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(jobs);
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }

    pub fn warm_ups(&self) -> usize {
        self.warm_ups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamingClient for GatedClient {
    async fn resolve_playable_url(
        &self,
        node: &MediaNode,
        is_folder_link: bool,
    ) -> Result<PlayableUrl> {
        self.resolves.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| BridgeError::OperationFailed(e.to_string()))?
                .forget();
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(
                "streaming server unavailable".to_string(),
            ));
        }

        let route = if is_folder_link { "link" } else { "stream" };
        Ok(PlayableUrl::new(format!(
            "http://127.0.0.1:4443/{}/{}",
            route, node.handle
        )))
    }

    async fn warm_up(&self, _url: &PlayableUrl) -> Result<()> {
        self.warm_ups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// A node whose identity comes from its content fingerprint.
pub fn node(handle: u64, content: &str) -> MediaNode {
    MediaNode::new(NodeHandle(handle), format!("video-{}.mp4", handle))
        .with_size(4096)
        .with_content_fingerprint(content)
}

/// Engine over an in-memory file tree holding `/a.mp4`, `/copy-of-a.mp4`
/// (same bytes) and `/b.mp4`.
pub fn engine() -> FingerprintEngine {
    let files = Arc::new(InMemoryFileAccessor::new());
    files.insert("/a.mp4", vec![0xAAu8; 1024]);
    files.insert("/copy-of-a.mp4", vec![0xAAu8; 1024]);
    files.insert("/b.mp4", vec![0xBBu8; 1024]);
    FingerprintEngine::new(files)
}
