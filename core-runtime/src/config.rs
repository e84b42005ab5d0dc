//! # Core Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host bridges and settings the core needs. It
//! enforces fail-fast validation so a missing capability is reported at
//! startup rather than on the first local-file fingerprint.
//!
//! ## Required Dependencies
//!
//! - `LocalFileAccessor` - Reads local media for content fingerprinting
//!
//! When the `desktop-shims` feature is enabled, the desktop `StdFileAccessor`
//! is injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .file_accessor(Arc::new(MyFileAccessor))
//!     .event_buffer_size(256)
//!     .build()?;
//!
//! let bus = config.event_bus();
//! ```
//!
//! ## Error Handling
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! // Without `desktop-shims` this fails with an actionable CapabilityMissing error
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use crate::events::{EventBus, DEFAULT_EVENT_BUFFER_SIZE};
use bridge_traits::LocalFileAccessor;
use std::sync::Arc;

/// Upper bound for the event channel capacity.
const MAX_EVENT_BUFFER_SIZE: usize = 65_536;

/// Core configuration for the playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Local file access used by the fingerprint engine (required)
    pub file_accessor: Arc<dyn LocalFileAccessor>,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    /// Publish context and preload events
    pub enable_events: bool,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("file_accessor", &"LocalFileAccessor { ... }")
            .field("event_buffer_size", &self.event_buffer_size)
            .field("enable_events", &self.enable_events)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.enable_events {
            if self.event_buffer_size == 0 {
                return Err(Error::Config(
                    "Event buffer size must be greater than 0 when events are enabled"
                        .to_string(),
                ));
            }

            if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
                return Err(Error::Config(format!(
                    "Event buffer size exceeds maximum of {}",
                    MAX_EVENT_BUFFER_SIZE
                )));
            }
        }

        Ok(())
    }

    /// Create the event bus described by this configuration.
    ///
    /// Returns `None` when events are disabled.
    pub fn event_bus(&self) -> Option<EventBus> {
        self.enable_events
            .then(|| EventBus::new(self.event_buffer_size))
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_accessor() -> Result<Arc<dyn LocalFileAccessor>> {
    use bridge_desktop::StdFileAccessor;

    let accessor: Arc<dyn LocalFileAccessor> = Arc::new(StdFileAccessor::new());
    Ok(accessor)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_accessor() -> Result<Arc<dyn LocalFileAccessor>> {
    Err(Error::CapabilityMissing {
        capability: "LocalFileAccessor".to_string(),
        message: "LocalFileAccessor implementation is required to fingerprint local media. \
                 Desktop: enable the 'desktop-shims' feature to use the default StdFileAccessor. \
                 Mobile: inject an accessor backed by the platform's sandboxed file APIs."
            .to_string(),
    })
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    file_accessor: Option<Arc<dyn LocalFileAccessor>>,
    event_buffer_size: Option<usize>,
    enable_events: Option<bool>,
}

impl CoreConfigBuilder {
    pub fn file_accessor(mut self, accessor: Arc<dyn LocalFileAccessor>) -> Self {
        self.file_accessor = Some(accessor);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Enable or disable event publishing (enabled by default)
    pub fn enable_events(mut self, enabled: bool) -> Self {
        self.enable_events = Some(enabled);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] if no file accessor is available
    /// - [`Error::Config`] if a value is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let file_accessor = match self.file_accessor {
            Some(accessor) => accessor,
            None => provide_default_file_accessor()?,
        };

        let config = CoreConfig {
            file_accessor,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            enable_events: self.enable_events.unwrap_or(true),
        };

        config.validate()?;

        Ok(config)
    }
}
