//! Async facade for the playback core.
//!
//! Every other crate in the workspace spawns work, sleeps, and cancels through
//! this crate instead of naming Tokio directly. The preload scheduler in
//! `core-playback` is the main consumer: it spawns warm-up tasks with
//! [`task::spawn`] on a captured [`runtime::Handle`] and cancels them through
//! [`sync::CancellationToken`].
//!
//! # Modules
//!
//! - `task`: task spawning and join handles
//! - `time`: sleep, timeout and instants
//! - `sync`: locks, channels, notifications and cancellation tokens
//! - `runtime`: runtime handles and `block_on`
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::task;
//!
//! # core_async::runtime::block_on(async {
//! let token = CancellationToken::new();
//! let child = token.clone();
//! let handle = task::spawn(async move { child.is_cancelled() });
//! token.cancel();
//! let _ = handle.await;
//! # });
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
