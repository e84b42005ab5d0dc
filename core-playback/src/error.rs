//! # Playback Error Types
//!
//! Error types for context construction, reuse and preload.
//!
//! None of these are fatal: reuse failures surface as `false`, preload
//! failures are recorded on the context, and stale results are dropped.

use crate::source::SourceKind;
use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur while managing playback contexts.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// A descriptor of one kind was offered to a context of the other kind.
    #[error("Source kind mismatch: context is {expected}, descriptor is {found}")]
    TypeMismatch {
        expected: SourceKind,
        found: SourceKind,
    },

    /// No content identity could be derived for a source.
    #[error("Fingerprint unavailable: {0}")]
    FingerprintUnavailable(String),

    /// Resolving or warming up a remote source failed.
    #[error("Preload failed: {0}")]
    PreloadFailed(String),

    /// A preload finished after its context was rebound or cancelled.
    #[error("Stale preload result discarded")]
    StalePreloadResult,

    /// Host bridge failure.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if scheduling the operation again may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::PreloadFailed(_)
                | PlaybackError::Bridge(BridgeError::OperationFailed(_))
                | PlaybackError::Bridge(BridgeError::Io(_))
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
