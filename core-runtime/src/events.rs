//! # Event Bus System
//!
//! Provides an event-driven view of the playback core using `tokio::sync::broadcast`.
//! Context lifecycle decisions and preload progress are published as typed
//! events so hosts (and tests) can observe them without hooking into the
//! control thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐
//! │ Reuse controller ├──────────>│           │
//! └──────────────────┘           │ EventBus  │    subscribe    ┌────────────┐
//!                                │ (broadcast├────────────────>│ Subscriber │
//! ┌──────────────────┐   emit    │  channel) │                 └────────────┘
//! │ Preload worker   ├──────────>│           │
//! └──────────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PreloadEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Preload(PreloadEvent::Started { generation: 1 }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event, CoreEvent::Preload(PreloadEvent::Started { generation: 1 }));
//! # }
//! ```
//!
//! ## Event Types
//!
//! ### Context Events
//! - `Created`: A fresh playback context was constructed
//! - `Reused`: An existing context was rebound to a new source
//! - `ReuseRefused`: Reuse was refused because the source kinds differ
//! - `CacheHit`: The manager took a context out of its per-kind cache
//! - `DetachedReturned`: The active detached (picture-in-picture) context was
//!   returned as-is
//!
//! ### Preload Events
//! - `Started`: A preload job was scheduled
//! - `Completed`: A preload result was committed
//! - `Failed`: A preload job failed and its failure was committed
//! - `Discarded`: A job finished after its context was rebound or cancelled
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped.
//!
//! Emitters ignore the "no subscribers" error returned by [`EventBus::emit`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default event bus buffer size.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event type for all playback core events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Context(ContextEvent),
    Preload(PreloadEvent),
}

// ============================================================================
// Context Events
// ============================================================================

/// Lifecycle decisions taken on playback contexts.
///
/// `kind` carries the source kind label (`"local_file"` / `"remote_node"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ContextEvent {
    Created {
        kind: String,
    },
    Reused {
        kind: String,
        /// `false` when the new source had the same fingerprint and the
        /// context kept its preload and flags.
        content_changed: bool,
    },
    ReuseRefused {
        expected: String,
        found: String,
    },
    CacheHit {
        kind: String,
    },
    DetachedReturned {
        kind: String,
    },
}

// ============================================================================
// Preload Events
// ============================================================================

/// Progress of asynchronous preload jobs, keyed by job generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PreloadEvent {
    Started {
        generation: u64,
    },
    Completed {
        generation: u64,
    },
    Failed {
        generation: u64,
        message: String,
    },
    Discarded {
        generation: u64,
        reason: String,
    },
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for broadcasting events to multiple subscribers.
///
/// Cloning the bus shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus holding up to `capacity` undelivered events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
