//! # Playback Context Manager
//!
//! Hands out playback contexts for new requests, preferring (in order):
//!
//! 1. the context currently presented detached from its screen
//!    (picture-in-picture), if it already plays the same content;
//! 2. the cached context of the same kind, rebound through the
//!    [`ReuseController`];
//! 3. a fresh context.
//!
//! The chosen context then gets a preload scheduled. Contexts return to the
//! cache when their full-screen presentation ends; there is one cache slot
//! per [`SourceKind`].
//!
//! All methods run on the control thread; the caller serializes them.

use crate::config::CONTEXT_CACHE_ENABLED;
use crate::context::PlaybackContext;
use crate::fingerprint::{same_content, Fingerprint, FingerprintEngine};
use crate::preload::PreloadScheduler;
use crate::reuse::ReuseController;
use crate::source::{SourceDescriptor, SourceKind};
use bridge_traits::{FileLocator, MediaNode, StreamingClient};
use core_async::runtime::Handle;
use core_runtime::config::CoreConfig;
use core_runtime::events::{ContextEvent, CoreEvent, EventBus};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};

/// A context shared between the manager and the presentation layer.
pub type SharedContext = Arc<Mutex<PlaybackContext>>;

#[derive(Default)]
struct ContextCache {
    local_file: Option<SharedContext>,
    remote_node: Option<SharedContext>,
}

impl ContextCache {
    fn slot(&mut self, kind: SourceKind) -> &mut Option<SharedContext> {
        match kind {
            SourceKind::LocalFile => &mut self.local_file,
            SourceKind::RemoteNode => &mut self.remote_node,
        }
    }
}

/// Chooses, caches and preloads playback contexts.
pub struct PlaybackContextManager {
    reuse: ReuseController,
    preload: PreloadScheduler,
    events: Option<EventBus>,
    cache: ContextCache,
    detached: Weak<Mutex<PlaybackContext>>,
}

impl PlaybackContextManager {
    pub fn new(reuse: ReuseController, preload: PreloadScheduler) -> Self {
        Self {
            reuse,
            preload,
            events: None,
            cache: ContextCache::default(),
            detached: Weak::new(),
        }
    }

    /// Wire a manager from the runtime configuration.
    ///
    /// Local files are fingerprinted through `config.file_accessor`. With
    /// events enabled, the manager, its reuse controller and its preload
    /// scheduler publish on one shared bus, available from
    /// [`event_bus`](Self::event_bus).
    pub fn from_config(config: &CoreConfig, runtime: Handle) -> Self {
        let mut reuse = ReuseController::new(FingerprintEngine::new(config.file_accessor.clone()));
        let mut preload = PreloadScheduler::new(runtime);

        let Some(bus) = config.event_bus() else {
            return Self::new(reuse, preload);
        };
        reuse = reuse.with_event_bus(bus.clone());
        preload = preload.with_event_bus(bus.clone());
        Self::new(reuse, preload).with_event_bus(bus)
    }

    /// Publish manager decisions on `bus`.
    ///
    /// Reuse and preload events are published by the controller and the
    /// scheduler themselves; give them the same bus.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.events.as_ref()
    }

    pub fn reuse_controller(&self) -> &ReuseController {
        &self.reuse
    }

    pub fn preload_scheduler(&self) -> &PreloadScheduler {
        &self.preload
    }

    /// Context for playing a remote node.
    pub fn context_for_node(
        &mut self,
        node: MediaNode,
        is_folder_link: bool,
        client: Arc<dyn StreamingClient>,
    ) -> SharedContext {
        self.context_for(SourceDescriptor::remote_node(node, is_folder_link, client))
    }

    /// Context for playing a local file.
    pub fn context_for_file(&mut self, locator: impl Into<FileLocator>) -> SharedContext {
        self.context_for(SourceDescriptor::local_file(locator))
    }

    #[instrument(skip(self, descriptor), fields(kind = %descriptor.kind()))]
    fn context_for(&mut self, descriptor: SourceDescriptor) -> SharedContext {
        let kind = descriptor.kind();
        // Computed once; the detached check, reuse and construction share it.
        let fingerprint = self.reuse.engine().fingerprint(&descriptor);

        if let Some(active) = self.detached.upgrade() {
            let matches = {
                let ctx = active.lock();
                ctx.kind() == kind && same_content(fingerprint.as_ref(), ctx.fingerprint())
            };
            if matches {
                debug!("Returning detached context already playing this content");
                self.emit(ContextEvent::DetachedReturned {
                    kind: kind.to_string(),
                });
                return active;
            }
        }

        let context = match self.take_cached(kind, descriptor.clone(), fingerprint) {
            Some(cached) => cached,
            None => {
                let ctx = PlaybackContext::with_fingerprint(descriptor, fingerprint);
                self.emit(ContextEvent::Created {
                    kind: kind.to_string(),
                });
                Arc::new(Mutex::new(ctx))
            }
        };

        // Detached so the caller never waits on the worker.
        let _ = self.preload.schedule(&context.lock());

        context
    }

    /// Take the cached context of `kind` out of the cache and rebind it.
    fn take_cached(
        &mut self,
        kind: SourceKind,
        descriptor: SourceDescriptor,
        fingerprint: Option<Fingerprint>,
    ) -> Option<SharedContext> {
        if !CONTEXT_CACHE_ENABLED {
            return None;
        }

        let cached = self.cache.slot(kind).take()?;
        self.emit(ContextEvent::CacheHit {
            kind: kind.to_string(),
        });

        let reused = self
            .reuse
            .reuse_fingerprinted(&mut cached.lock(), descriptor, fingerprint);
        match reused {
            Ok(_) => Some(cached),
            Err(e) => {
                warn!(error = %e, "Cached context could not be reused");
                None
            }
        }
    }

    /// The presentation of `context` is ending; keep it for reuse.
    ///
    /// Replaces any context previously cached for the same kind.
    pub fn presentation_will_end(&mut self, context: SharedContext) {
        if !CONTEXT_CACHE_ENABLED {
            return;
        }

        let kind = context.lock().kind();
        if self.cache.slot(kind).replace(context).is_some() {
            debug!(kind = %kind, "Replaced cached context");
        }
    }

    /// `context` started detached presentation (picture-in-picture).
    ///
    /// The manager does not keep the context alive.
    pub fn detached_presentation_started(&mut self, context: &SharedContext) {
        info!(kind = %context.lock().kind(), "Detached presentation started");
        self.detached = Arc::downgrade(context);
    }

    pub fn detached_presentation_stopped(&mut self) {
        debug!("Detached presentation stopped");
        self.detached = Weak::new();
    }

    /// Returns `true` if `context` is the one presented detached.
    pub fn is_detached_presentation_active(&self, context: &SharedContext) -> bool {
        self.detached
            .upgrade()
            .is_some_and(|active| Arc::ptr_eq(&active, context))
    }

    /// Returns `true` if a context of `kind` is waiting in the cache.
    pub fn has_cached(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::LocalFile => self.cache.local_file.is_some(),
            SourceKind::RemoteNode => self.cache.remote_node.is_some(),
        }
    }

    fn emit(&self, event: ContextEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::Context(event));
        }
    }
}

impl std::fmt::Debug for PlaybackContextManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackContextManager")
            .field("cached_local_file", &self.cache.local_file.is_some())
            .field("cached_remote_node", &self.cache.remote_node.is_some())
            .field("detached_active", &(self.detached.strong_count() > 0))
            .finish()
    }
}
