//! Local File Access Implementation using `std::fs`

use bridge_traits::{
    error::{BridgeError, Result},
    media::FileLocator,
    storage::{FileMetadata, LocalFileAccessor},
};
use bytes::Bytes;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::time::UNIX_EPOCH;
use tracing::trace;

/// Blocking file accessor for desktop hosts
///
/// Resolves plain paths and `file://` URIs. Reads are bounded by the caller's
/// `len`, so fingerprinting large videos only touches the sampled ranges.
#[derive(Debug, Default, Clone)]
pub struct StdFileAccessor;

impl StdFileAccessor {
    pub fn new() -> Self {
        Self
    }

    /// Convert std::io::Error to BridgeError, keeping "not found" distinct
    fn map_io_error(locator: &FileLocator, e: std::io::Error) -> BridgeError {
        if e.kind() == ErrorKind::NotFound {
            BridgeError::NotFound(locator.to_string())
        } else {
            BridgeError::Io(e)
        }
    }
}

impl LocalFileAccessor for StdFileAccessor {
    fn metadata(&self, locator: &FileLocator) -> Result<FileMetadata> {
        let path = locator.to_path()?;
        let metadata = std::fs::metadata(&path).map_err(|e| Self::map_io_error(locator, e))?;

        Ok(FileMetadata {
            size: metadata.len(),
            modified_at: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64),
            is_directory: metadata.is_dir(),
        })
    }

    fn read_range(&self, locator: &FileLocator, offset: u64, len: usize) -> Result<Bytes> {
        let path = locator.to_path()?;
        let mut file = File::open(&path).map_err(|e| Self::map_io_error(locator, e))?;
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = Vec::with_capacity(len);
        file.take(len as u64).read_to_end(&mut buffer)?;

        trace!(offset, requested = len, read = buffer.len(), "Read file range");
        Ok(Bytes::from(buffer))
    }
}
