//! Media reference types shared between the core and host adapters.
//!
//! These are the values a host hands to the playback core: a [`FileLocator`]
//! for local content and a [`MediaNode`] for content reached through a
//! streaming client. The core never interprets them beyond the attributes
//! documented here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{BridgeError, Result};

const FILE_URI_SCHEME: &str = "file://";

/// Opaque reference to a local media file.
///
/// Accepts plain filesystem paths as well as `file://` URIs. Two locators may
/// point at identical content without being equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocator(String);

impl FileLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the locator was given as a `file://` URI.
    pub fn is_uri(&self) -> bool {
        self.0.starts_with(FILE_URI_SCHEME)
    }

    /// Filesystem path this locator refers to.
    ///
    /// `file://` URIs are percent-decoded; anything else is taken as a plain
    /// path.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidLocator`] if a `file://` URI does not parse or
    /// names a remote host.
    pub fn to_path(&self) -> Result<PathBuf> {
        if !self.is_uri() {
            return Ok(PathBuf::from(&self.0));
        }

        let url = Url::parse(&self.0)
            .map_err(|e| BridgeError::InvalidLocator(format!("{}: {}", self.0, e)))?;
        url.to_file_path()
            .map_err(|_| BridgeError::InvalidLocator(format!("{} is not a local file URI", self.0)))
    }
}

impl fmt::Display for FileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileLocator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FileLocator {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<PathBuf> for FileLocator {
    fn from(value: PathBuf) -> Self {
        Self::from_path(value)
    }
}

/// Handle of a node in the remote file tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A remote media node as reported by the streaming backend.
///
/// `content_fingerprint` and `checksum` are intrinsic to the node's bytes;
/// the handle and name are not (the same content may be reachable through
/// several handles, e.g. a shared copy opened via a folder link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaNode {
    pub handle: NodeHandle,
    pub name: String,
    pub size: Option<u64>,
    pub modified_at: Option<i64>,
    pub content_fingerprint: Option<String>,
    pub checksum: Option<String>,
}

impl MediaNode {
    pub fn new(handle: NodeHandle, name: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
            size: None,
            modified_at: None,
            content_fingerprint: None,
            checksum: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified_at(mut self, modified_at: i64) -> Self {
        self.modified_at = Some(modified_at);
        self
    }

    pub fn with_content_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.content_fingerprint = Some(fingerprint.into());
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }
}
