//! # Playback Context
//!
//! The long-lived object the presentation layer binds to a surface. A context
//! is created for exactly one [`SourceKind`] and keeps that kind for life;
//! its descriptor can be swapped in place by the
//! [`ReuseController`](crate::reuse::ReuseController).

use crate::fingerprint::{Fingerprint, FingerprintEngine};
use crate::preload::{PreloadSlot, PreloadState, PreloadToken};
use crate::source::{SourceDescriptor, SourceKind};
use bridge_traits::{FileLocator, MediaNode, PlayableUrl, StreamingClient};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// A playback surface bound to one source.
#[derive(Debug)]
pub struct PlaybackContext {
    kind: SourceKind,
    descriptor: SourceDescriptor,
    fingerprint: Option<Fingerprint>,
    has_played_once_before: bool,
    is_end_playing: bool,
    preload: Arc<Mutex<PreloadSlot>>,
}

impl PlaybackContext {
    /// Create a context for a local file.
    pub fn for_file(locator: impl Into<FileLocator>, engine: &FingerprintEngine) -> Self {
        Self::from_descriptor(SourceDescriptor::local_file(locator), engine)
    }

    /// Create a context for a remote node.
    pub fn for_node(
        node: MediaNode,
        is_folder_link: bool,
        client: Arc<dyn StreamingClient>,
        engine: &FingerprintEngine,
    ) -> Self {
        Self::from_descriptor(
            SourceDescriptor::remote_node(node, is_folder_link, client),
            engine,
        )
    }

    pub(crate) fn from_descriptor(descriptor: SourceDescriptor, engine: &FingerprintEngine) -> Self {
        let fingerprint = engine.fingerprint(&descriptor);
        Self::with_fingerprint(descriptor, fingerprint)
    }

    /// Create a context whose fingerprint was already computed for `descriptor`.
    pub(crate) fn with_fingerprint(
        descriptor: SourceDescriptor,
        fingerprint: Option<Fingerprint>,
    ) -> Self {
        let context = Self {
            kind: descriptor.kind(),
            descriptor,
            fingerprint,
            has_played_once_before: false,
            is_end_playing: false,
            preload: Arc::new(Mutex::new(PreloadSlot::default())),
        };

        debug!(
            kind = %context.kind,
            fingerprint = ?context.fingerprint,
            "Created playback context"
        );
        context
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    /// Content identity of the current source, for out-of-band comparisons.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Hex rendering of [`fingerprint`](Self::fingerprint).
    pub fn fingerprint_hex(&self) -> Option<String> {
        self.fingerprint.as_ref().map(Fingerprint::to_hex)
    }

    pub fn has_played_once_before(&self) -> bool {
        self.has_played_once_before
    }

    pub fn is_end_playing(&self) -> bool {
        self.is_end_playing
    }

    /// Record that playback of the current source has started at least once.
    pub fn mark_played_once(&mut self) {
        self.has_played_once_before = true;
    }

    pub fn set_end_playing(&mut self, ended: bool) {
        self.is_end_playing = ended;
    }

    /// Snapshot of the preload state.
    pub fn preload_state(&self) -> PreloadState {
        self.preload.lock().state.clone()
    }

    /// URL resolved by the last committed preload, if any.
    pub fn preloaded_url(&self) -> Option<PlayableUrl> {
        self.preload.lock().resolved_url.clone()
    }

    pub(crate) fn preload_slot(&self) -> &Arc<Mutex<PreloadSlot>> {
        &self.preload
    }

    /// Swap in a descriptor with the same content. Flags and preload survive.
    pub(crate) fn replace_descriptor(&mut self, descriptor: SourceDescriptor) {
        debug_assert_eq!(descriptor.kind(), self.kind);
        self.descriptor = descriptor;
    }

    /// Bind to new content: replace descriptor and fingerprint, reset the
    /// progress flags and drop any preload for the old content.
    ///
    /// Returns the token of the preload that was cancelled, if one was in flight.
    pub(crate) fn rotate(
        &mut self,
        descriptor: SourceDescriptor,
        fingerprint: Option<Fingerprint>,
    ) -> Option<PreloadToken> {
        debug_assert_eq!(descriptor.kind(), self.kind);
        self.descriptor = descriptor;
        self.fingerprint = fingerprint;
        self.has_played_once_before = false;
        self.is_end_playing = false;
        self.preload.lock().reset()
    }
}

impl Drop for PlaybackContext {
    fn drop(&mut self) {
        // An in-flight worker only holds the slot; nobody can observe its result.
        self.preload.lock().reset();
    }
}
