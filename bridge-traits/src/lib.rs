//! # Host Bridge Traits
//!
//! Capabilities the playback core needs from its host, expressed as traits the
//! host implements per platform.
//!
//! ## Traits
//!
//! - [`StreamingClient`](streaming::StreamingClient) - Resolve remote nodes to
//!   playable URLs and warm them up
//! - [`LocalFileAccessor`](storage::LocalFileAccessor) - Read local media for
//!   content fingerprinting
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//! | Mobile   | host-provided       |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Adapters should
//! convert platform errors into it with enough context (locator, node handle)
//! to be actionable, without embedding folder-link keys.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`: the streaming client is invoked
//! from preload tasks on the async runtime while the control thread keeps
//! its own reference.

pub mod error;
pub mod logging;
pub mod media;
pub mod storage;
pub mod streaming;

pub use error::BridgeError;

pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{FileLocator, MediaNode, NodeHandle};
pub use storage::{FileMetadata, InMemoryFileAccessor, LocalFileAccessor};
pub use streaming::{PlayableUrl, StreamingClient};
