//! Synchronization primitives.
//!
//! Async-aware locks and channels come from `tokio::sync`; cooperative
//! cancellation comes from `tokio_util::sync::CancellationToken`.
//!
//! A [`CancellationToken`] is advisory: cancelling it does not interrupt the
//! task holding a clone, it only flips a flag (and wakes `cancelled()` waiters).
//! Workers are expected to check it before committing results.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{CancellationToken, Mutex};
//!
//! # core_async::runtime::block_on(async {
//! let mutex = Mutex::new(42);
//! *mutex.lock().await += 1;
//!
//! let token = CancellationToken::new();
//! let child = token.child_token();
//! token.cancel();
//! assert!(child.is_cancelled());
//! # });
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Barrier, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard, Semaphore, SemaphorePermit,
};

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
