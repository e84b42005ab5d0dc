//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `LocalFileAccessor` using `std::fs`
//! - `StreamingClient` using `reqwest` against a local or remote streaming
//!   gateway
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HttpStreamingClient, StdFileAccessor};
//! use std::sync::Arc;
//!
//! let files = Arc::new(StdFileAccessor::new());
//! let client = Arc::new(HttpStreamingClient::new("http://127.0.0.1:4443")?);
//! ```

mod filesystem;
mod streaming;

pub use filesystem::StdFileAccessor;
pub use streaming::{HttpStreamingClient, RetryPolicy};
