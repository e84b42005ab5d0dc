//! Runtime setup errors.
//!
//! Raised while building [`CoreConfig`](crate::config::CoreConfig) or
//! installing the logging subscriber; playback itself reports through
//! `core_playback::PlaybackError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is out of range, or logging could not be set up.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A host bridge the core needs was neither injected nor provided by a
    /// platform shim.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_missing_names_the_bridge() {
        let err = Error::CapabilityMissing {
            capability: "LocalFileAccessor".to_string(),
            message: "inject one".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Capability missing: LocalFileAccessor - inject one"
        );
    }
}
