//! # Reuse Controller
//!
//! Decides whether an existing context can be rebound to a new source in
//! place instead of being rebuilt.
//!
//! A context only ever accepts descriptors of its own kind. Within a kind,
//! the new source's fingerprint decides what survives the swap:
//!
//! | new fingerprint            | descriptor | flags | preload             |
//! |----------------------------|------------|-------|---------------------|
//! | equal to the current one   | replaced   | kept  | kept                |
//! | different, or unavailable  | replaced   | reset | cancelled, `Idle`   |

use crate::context::PlaybackContext;
use crate::error::{PlaybackError, Result};
use crate::fingerprint::{same_content, Fingerprint, FingerprintEngine};
use crate::preload::PreloadToken;
use crate::source::SourceDescriptor;
use bridge_traits::{FileLocator, MediaNode, StreamingClient};
use core_runtime::events::{ContextEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// How a successful reuse changed the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReuseOutcome {
    /// Same content: only the descriptor was replaced.
    SameContent,
    /// New content: flags reset and preload dropped.
    ContentChanged {
        cancelled_preload: Option<PreloadToken>,
    },
}

/// Rebinds playback contexts to new sources.
#[derive(Clone)]
pub struct ReuseController {
    engine: FingerprintEngine,
    events: Option<EventBus>,
}

impl ReuseController {
    pub fn new(engine: FingerprintEngine) -> Self {
        Self {
            engine,
            events: None,
        }
    }

    /// Publish reuse decisions on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn engine(&self) -> &FingerprintEngine {
        &self.engine
    }

    /// Rebind `context` to `descriptor` if the kinds match.
    ///
    /// Returns `false` (leaving the context untouched) on a kind mismatch.
    pub fn try_reuse(&self, context: &mut PlaybackContext, descriptor: SourceDescriptor) -> bool {
        match self.reuse(context, descriptor) {
            Ok(_) => true,
            Err(PlaybackError::TypeMismatch { .. }) => false,
            Err(e) => {
                warn!(error = %e, "Unexpected reuse failure");
                false
            }
        }
    }

    /// [`try_reuse`](Self::try_reuse) with a local file.
    pub fn try_reuse_with_file(
        &self,
        context: &mut PlaybackContext,
        locator: impl Into<FileLocator>,
    ) -> bool {
        self.try_reuse(context, SourceDescriptor::local_file(locator))
    }

    /// [`try_reuse`](Self::try_reuse) with a remote node.
    pub fn try_reuse_with_node(
        &self,
        context: &mut PlaybackContext,
        node: MediaNode,
        is_folder_link: bool,
        client: Arc<dyn StreamingClient>,
    ) -> bool {
        self.try_reuse(
            context,
            SourceDescriptor::remote_node(node, is_folder_link, client),
        )
    }

    /// Rebind `context` to `descriptor`, reporting what changed.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::TypeMismatch`] if the descriptor's kind differs from
    /// the context's. The context is left unchanged.
    #[instrument(skip(self, context, descriptor), fields(kind = %context.kind()))]
    pub fn reuse(
        &self,
        context: &mut PlaybackContext,
        descriptor: SourceDescriptor,
    ) -> Result<ReuseOutcome> {
        self.check_kind(context, &descriptor)?;

        let fingerprint = match self.engine.try_fingerprint(&descriptor) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                debug!(error = %e, "Treating source without fingerprint as new content");
                None
            }
        };

        Ok(self.rebind(context, descriptor, fingerprint))
    }

    /// [`reuse`](Self::reuse) with a fingerprint already computed for
    /// `descriptor` by [`engine`](Self::engine).
    pub(crate) fn reuse_fingerprinted(
        &self,
        context: &mut PlaybackContext,
        descriptor: SourceDescriptor,
        fingerprint: Option<Fingerprint>,
    ) -> Result<ReuseOutcome> {
        self.check_kind(context, &descriptor)?;
        Ok(self.rebind(context, descriptor, fingerprint))
    }

    fn check_kind(&self, context: &PlaybackContext, descriptor: &SourceDescriptor) -> Result<()> {
        if descriptor.kind() == context.kind() {
            return Ok(());
        }

        debug!(found = %descriptor.kind(), "Refusing reuse across source kinds");
        self.emit(ContextEvent::ReuseRefused {
            expected: context.kind().to_string(),
            found: descriptor.kind().to_string(),
        });
        Err(PlaybackError::TypeMismatch {
            expected: context.kind(),
            found: descriptor.kind(),
        })
    }

    fn rebind(
        &self,
        context: &mut PlaybackContext,
        descriptor: SourceDescriptor,
        fingerprint: Option<Fingerprint>,
    ) -> ReuseOutcome {
        let outcome = if same_content(fingerprint.as_ref(), context.fingerprint()) {
            context.replace_descriptor(descriptor);
            debug!("Reused context for the same content");
            ReuseOutcome::SameContent
        } else {
            let cancelled_preload = context.rotate(descriptor, fingerprint);
            debug!(
                cancelled = ?cancelled_preload.map(|t| t.generation()),
                fingerprint = ?fingerprint,
                "Rebound context to new content"
            );
            ReuseOutcome::ContentChanged { cancelled_preload }
        };

        self.emit(ContextEvent::Reused {
            kind: context.kind().to_string(),
            content_changed: outcome != ReuseOutcome::SameContent,
        });

        outcome
    }

    fn emit(&self, event: ContextEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::Context(event));
        }
    }
}

impl std::fmt::Debug for ReuseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReuseController")
            .field("engine", &self.engine)
            .field("has_event_bus", &self.events.is_some())
            .finish()
    }
}
