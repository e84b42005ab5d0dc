//! # Playback Context Module
//!
//! Lifecycle management for media playback surfaces.
//!
//! ## Overview
//!
//! This module handles:
//! - Typed construction of playback contexts for local files and remote nodes
//! - Content fingerprints that identify a source independently of its path,
//!   handle or access mode
//! - In-place reuse of a context for a new source of the same kind
//! - Cancellable asynchronous preload of remote sources
//! - A manager that picks the detached, cached or a fresh context per request
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{FingerprintEngine, PlaybackContextManager, PreloadScheduler, ReuseController};
//!
//! let engine = FingerprintEngine::new(config.file_accessor.clone());
//! let mut manager = PlaybackContextManager::new(
//!     ReuseController::new(engine),
//!     PreloadScheduler::new(runtime_handle),
//! );
//!
//! let ctx = manager.context_for_node(node, false, streaming_client);
//! // ... present ...
//! manager.presentation_will_end(ctx);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod fingerprint;
pub mod manager;
pub mod preload;
pub mod reuse;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{FingerprintConfig, CONTEXT_CACHE_ENABLED, PRELOAD_ENABLED};
pub use context::PlaybackContext;
pub use error::{PlaybackError, Result};
pub use fingerprint::{Fingerprint, FingerprintEngine};
pub use manager::{PlaybackContextManager, SharedContext};
pub use preload::{PreloadOutcome, PreloadScheduler, PreloadState, PreloadToken};
pub use reuse::{ReuseController, ReuseOutcome};
pub use source::{SourceDescriptor, SourceKind, StreamingAccess};
