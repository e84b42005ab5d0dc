//! Workspace facade crate.
//!
//! Re-exports the playback core and maps the workspace feature flags onto
//! the individual crates, so a host can depend on `playback-workspace` alone:
//!
//! - `desktop-shims`: default `std::fs` file accessor and the HTTP streaming
//!   client from `bridge-desktop`
//! - `preload`: asynchronous warm-up of remote sources
//! - `context-cache`: one reusable context per source kind

pub use core_playback as playback;
pub use core_runtime as runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop as desktop;
