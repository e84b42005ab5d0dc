//! Local File Access Abstraction
//!
//! The fingerprint engine reads local media through this trait so that hosts
//! with sandboxed storage (document pickers, security-scoped URLs) can supply
//! their own resolution.

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{BridgeError, Result};
use crate::media::FileLocator;

/// File metadata information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// Local file accessor trait
///
/// Calls are synchronous: they run on the presentation layer's control thread
/// while a context is being built or reused.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::LocalFileAccessor;
///
/// fn header(fs: &dyn LocalFileAccessor, locator: &FileLocator) -> Result<Bytes> {
///     fs.read_range(locator, 0, 4096)
/// }
/// ```
pub trait LocalFileAccessor: Send + Sync {
    /// Get metadata for the file a locator points at
    fn metadata(&self, locator: &FileLocator) -> Result<FileMetadata>;

    /// Read up to `len` bytes starting at `offset`
    ///
    /// Returns fewer bytes when the range runs past the end of the file.
    fn read_range(&self, locator: &FileLocator, offset: u64, len: usize) -> Result<Bytes>;
}

/// In-memory file accessor for testing/development
///
/// Files are keyed by their exact locator string.
#[derive(Debug, Default)]
pub struct InMemoryFileAccessor {
    files: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryFileAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, locator: impl Into<String>, content: impl Into<Bytes>) {
        self.files.write().insert(locator.into(), content.into());
    }

    pub fn remove(&self, locator: &str) -> Option<Bytes> {
        self.files.write().remove(locator)
    }

    fn get(&self, locator: &FileLocator) -> Result<Bytes> {
        self.files
            .read()
            .get(locator.as_str())
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(locator.to_string()))
    }
}

impl LocalFileAccessor for InMemoryFileAccessor {
    fn metadata(&self, locator: &FileLocator) -> Result<FileMetadata> {
        let content = self.get(locator)?;
        Ok(FileMetadata {
            size: content.len() as u64,
            modified_at: None,
            is_directory: false,
        })
    }

    fn read_range(&self, locator: &FileLocator, offset: u64, len: usize) -> Result<Bytes> {
        let content = self.get(locator)?;
        let start = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .min(content.len());
        let end = start.saturating_add(len).min(content.len());
        Ok(content.slice(start..end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_metadata() {
        let fs = InMemoryFileAccessor::new();
        fs.insert("/a.mp4", Bytes::from_static(b"0123456789"));

        let meta = fs.metadata(&FileLocator::new("/a.mp4")).unwrap();
        assert_eq!(meta.size, 10);
        assert!(!meta.is_directory);
    }

    #[test]
    fn test_in_memory_read_range_clamps() {
        let fs = InMemoryFileAccessor::new();
        fs.insert("/a.mp4", Bytes::from_static(b"0123456789"));
        let locator = FileLocator::new("/a.mp4");

        assert_eq!(fs.read_range(&locator, 2, 3).unwrap(), Bytes::from_static(b"234"));
        assert_eq!(fs.read_range(&locator, 8, 10).unwrap(), Bytes::from_static(b"89"));
        assert!(fs.read_range(&locator, 20, 4).unwrap().is_empty());
    }

    #[test]
    fn test_in_memory_missing_file() {
        let fs = InMemoryFileAccessor::new();
        let err = fs.metadata(&FileLocator::new("/missing.mp4")).unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }
}
