//! # Preload Scheduler
//!
//! Warms up remote sources before playback starts.
//!
//! ## Overview
//!
//! [`PreloadScheduler::schedule`] returns immediately; the warm-up runs as a
//! task on the async runtime. Each job carries a [`PreloadToken`] (a
//! per-context generation plus the fingerprint it was started for) and a
//! `CancellationToken`. The context's preload slot is shared only with its
//! worker, and the worker commits with a compare-and-swap: it writes
//! `Completed` / `Failed` only if the slot still shows `InFlight` with its own
//! token and the job was not cancelled. Anything else means the context was
//! rebound in the meantime, and the result is discarded.
//!
//! ## State Machine
//!
//! ```text
//!   Idle ──schedule──> InFlight(t) ──worker──> Completed(t)
//!    ^                     │                └─> Failed(t) ──schedule──> InFlight(t')
//!    └──────rotation───────┴──────────────── (from any state)
//! ```
//!
//! ## Cancellation
//!
//! Cancellation is cooperative: a cancelled worker skips the warm-up if it
//! has not started it yet, and its result is never committed.

use crate::config::PRELOAD_ENABLED;
use crate::context::PlaybackContext;
use crate::error::{PlaybackError, Result};
use crate::fingerprint::Fingerprint;
use crate::source::{SourceDescriptor, StreamingAccess};
use bridge_traits::{MediaNode, PlayableUrl};
use core_async::runtime::Handle;
use core_async::sync::CancellationToken;
use core_async::task::{self, JoinHandle};
use core_runtime::events::{CoreEvent, EventBus, PreloadEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

// ============================================================================
// State Types
// ============================================================================

/// Identifies one preload job of one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreloadToken {
    generation: u64,
    fingerprint: Option<Fingerprint>,
}

impl PreloadToken {
    /// Per-context job counter; never reused within a context.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fingerprint of the content the job was started for.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }
}

/// Preload progress of a context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreloadState {
    #[default]
    Idle,
    InFlight(PreloadToken),
    Completed(PreloadToken),
    Failed(PreloadToken),
}

impl PreloadState {
    pub fn token(&self) -> Option<&PreloadToken> {
        match self {
            PreloadState::Idle => None,
            PreloadState::InFlight(t) | PreloadState::Completed(t) | PreloadState::Failed(t) => {
                Some(t)
            }
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, PreloadState::InFlight(_))
    }
}

/// What a preload worker did with its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadOutcome {
    Completed(PreloadToken),
    Failed(PreloadToken),
    /// The context was rebound or dropped before the job finished.
    Discarded(PreloadToken),
}

/// Per-context preload bookkeeping, shared between a context and its worker.
#[derive(Debug, Default)]
pub(crate) struct PreloadSlot {
    pub(crate) state: PreloadState,
    pub(crate) resolved_url: Option<PlayableUrl>,
    next_generation: u64,
    cancel: Option<CancellationToken>,
}

impl PreloadSlot {
    /// Start a job if none is running and none has completed.
    fn begin(&mut self, fingerprint: Option<Fingerprint>) -> Option<(PreloadToken, CancellationToken)> {
        match self.state {
            PreloadState::InFlight(_) | PreloadState::Completed(_) => None,
            PreloadState::Idle | PreloadState::Failed(_) => {
                self.next_generation += 1;
                let token = PreloadToken {
                    generation: self.next_generation,
                    fingerprint,
                };
                let cancel = CancellationToken::new();
                self.cancel = Some(cancel.clone());
                self.state = PreloadState::InFlight(token);
                Some((token, cancel))
            }
        }
    }

    /// Compare-and-swap commit of a worker result.
    fn commit(
        &mut self,
        token: PreloadToken,
        cancel: &CancellationToken,
        result: Result<PlayableUrl>,
    ) -> Result<PreloadOutcome> {
        let current = matches!(self.state, PreloadState::InFlight(t) if t == token);
        if !current || cancel.is_cancelled() {
            return Err(PlaybackError::StalePreloadResult);
        }

        self.cancel = None;
        match result {
            Ok(url) => {
                self.state = PreloadState::Completed(token);
                self.resolved_url = Some(url);
                Ok(PreloadOutcome::Completed(token))
            }
            Err(_) => {
                self.state = PreloadState::Failed(token);
                Ok(PreloadOutcome::Failed(token))
            }
        }
    }

    /// Cancel any running job and return to `Idle`.
    ///
    /// Returns the token of the job that was in flight, if any.
    pub(crate) fn reset(&mut self) -> Option<PreloadToken> {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.resolved_url = None;
        match std::mem::take(&mut self.state) {
            PreloadState::InFlight(token) => Some(token),
            _ => None,
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Spawns preload jobs for remote contexts.
#[derive(Clone)]
pub struct PreloadScheduler {
    runtime: Handle,
    events: Option<EventBus>,
}

impl PreloadScheduler {
    /// Create a scheduler spawning onto `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            events: None,
        }
    }

    /// Create a scheduler for the runtime the caller is running in.
    ///
    /// Returns `None` outside of a runtime.
    pub fn current() -> Option<Self> {
        core_async::runtime::current_handle().map(Self::new)
    }

    /// Publish preload progress on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Start warming up the context's source unless that is pointless.
    ///
    /// No-op (returns `None`) when preloading is compiled out, for local
    /// files, and while a job for the current content is running or has
    /// completed. A `Failed` preload is retried.
    ///
    /// The returned handle may be dropped; the job keeps running.
    #[instrument(skip(self, context), fields(kind = %context.kind()))]
    pub fn schedule(&self, context: &PlaybackContext) -> Option<JoinHandle<PreloadOutcome>> {
        if !PRELOAD_ENABLED {
            trace!("Preload disabled at build time");
            return None;
        }

        let (node, access) = match context.descriptor() {
            SourceDescriptor::RemoteNode { node, access } => (node.clone(), access.clone()),
            SourceDescriptor::LocalFile { .. } => {
                trace!("Local sources are not preloaded");
                return None;
            }
        };

        let slot = Arc::clone(context.preload_slot());
        let begun = slot.lock().begin(context.fingerprint().copied());
        let Some((token, cancel)) = begun else {
            debug!(state = ?context.preload_state(), "Preload already running or done");
            return None;
        };

        debug!(generation = token.generation, "Scheduling preload");
        emit(&self.events, PreloadEvent::Started {
            generation: token.generation,
        });

        let events = self.events.clone();
        Some(task::spawn_on(
            &self.runtime,
            run_preload(slot, token, cancel, node, access, events),
        ))
    }
}

impl std::fmt::Debug for PreloadScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadScheduler")
            .field("has_event_bus", &self.events.is_some())
            .finish()
    }
}

async fn run_preload(
    slot: Arc<Mutex<PreloadSlot>>,
    token: PreloadToken,
    cancel: CancellationToken,
    node: MediaNode,
    access: StreamingAccess,
    events: Option<EventBus>,
) -> PreloadOutcome {
    let result = warm_up(&node, &access, &cancel).await;
    let failure = result.as_ref().err().map(|e| e.to_string());

    let committed = slot.lock().commit(token, &cancel, result);

    match committed {
        Ok(outcome @ PreloadOutcome::Completed(_)) => {
            debug!(generation = token.generation, "Preload completed");
            emit(&events, PreloadEvent::Completed {
                generation: token.generation,
            });
            outcome
        }
        Ok(outcome) => {
            let message = failure.unwrap_or_default();
            warn!(generation = token.generation, error = %message, "Preload failed");
            emit(&events, PreloadEvent::Failed {
                generation: token.generation,
                message,
            });
            outcome
        }
        Err(stale) => {
            debug!(generation = token.generation, reason = %stale, "Discarding preload result");
            emit(&events, PreloadEvent::Discarded {
                generation: token.generation,
                reason: stale.to_string(),
            });
            PreloadOutcome::Discarded(token)
        }
    }
}

async fn warm_up(
    node: &MediaNode,
    access: &StreamingAccess,
    cancel: &CancellationToken,
) -> Result<PlayableUrl> {
    let client = access.client();
    let url = client
        .resolve_playable_url(node, access.is_folder_link())
        .await
        .map_err(|e| PlaybackError::PreloadFailed(format!("resolve failed: {}", e)))?;

    if cancel.is_cancelled() {
        return Err(PlaybackError::StalePreloadResult);
    }

    client
        .warm_up(&url)
        .await
        .map_err(|e| PlaybackError::PreloadFailed(format!("warm-up failed: {}", e)))?;

    trace!(handle = %node.handle, url = %url, "Stream warmed up");
    Ok(url)
}

fn emit(events: &Option<EventBus>, event: PreloadEvent) {
    if let Some(bus) = events {
        // No subscribers is not an error.
        let _ = bus.emit(CoreEvent::Preload(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> PlayableUrl {
        PlayableUrl::new("http://127.0.0.1/stream/1")
    }

    #[test]
    fn test_begin_skips_in_flight_and_completed() {
        let mut slot = PreloadSlot::default();

        let (token, cancel) = slot.begin(None).unwrap();
        assert_eq!(token.generation(), 1);
        assert!(slot.begin(None).is_none());

        assert_eq!(
            slot.commit(token, &cancel, Ok(url())).unwrap(),
            PreloadOutcome::Completed(token)
        );
        assert!(slot.begin(None).is_none());
        assert_eq!(slot.resolved_url, Some(url()));
    }

    #[test]
    fn test_failed_can_retry_with_new_generation() {
        let mut slot = PreloadSlot::default();
        let (token, cancel) = slot.begin(None).unwrap();

        let outcome = slot
            .commit(token, &cancel, Err(PlaybackError::PreloadFailed("503".into())))
            .unwrap();
        assert_eq!(outcome, PreloadOutcome::Failed(token));
        assert_eq!(slot.state, PreloadState::Failed(token));

        let (retry, _) = slot.begin(None).unwrap();
        assert_eq!(retry.generation(), 2);
        assert!(slot.state.is_in_flight());
    }

    #[test]
    fn test_reset_cancels_and_rejects_late_commit() {
        let mut slot = PreloadSlot::default();
        let (token, cancel) = slot.begin(None).unwrap();

        assert_eq!(slot.reset(), Some(token));
        assert!(cancel.is_cancelled());
        assert_eq!(slot.state, PreloadState::Idle);

        assert!(matches!(
            slot.commit(token, &cancel, Ok(url())),
            Err(PlaybackError::StalePreloadResult)
        ));
        assert_eq!(slot.state, PreloadState::Idle);
        assert!(slot.resolved_url.is_none());
    }

    #[test]
    fn test_commit_rejects_other_generation() {
        let mut slot = PreloadSlot::default();
        let (old, old_cancel) = slot.begin(None).unwrap();
        slot.reset();
        let (_new, _) = slot.begin(None).unwrap();

        // Not cancelled by hand, but the slot belongs to a newer job.
        let fresh_cancel = CancellationToken::new();
        assert!(slot.commit(old, &fresh_cancel, Ok(url())).is_err());
        assert!(old_cancel.is_cancelled());
        assert!(slot.state.is_in_flight());
    }

    #[test]
    fn test_reset_from_completed_clears_url() {
        let mut slot = PreloadSlot::default();
        let (token, cancel) = slot.begin(None).unwrap();
        slot.commit(token, &cancel, Ok(url())).unwrap();

        assert_eq!(slot.reset(), None);
        assert_eq!(slot.state, PreloadState::Idle);
        assert!(slot.resolved_url.is_none());
    }

    #[test]
    fn test_state_token_accessor() {
        let token = PreloadToken {
            generation: 4,
            fingerprint: None,
        };
        assert_eq!(PreloadState::Idle.token(), None);
        assert_eq!(PreloadState::Failed(token).token(), Some(&token));
        assert!(PreloadState::InFlight(token).is_in_flight());
        assert!(!PreloadState::Completed(token).is_in_flight());
    }
}
