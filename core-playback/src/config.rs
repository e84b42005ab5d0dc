//! # Playback Configuration
//!
//! Build-time capability flags and fingerprint tuning.

use serde::{Deserialize, Serialize};

/// Whether remote contexts are warmed up asynchronously (cargo feature `preload`).
pub const PRELOAD_ENABLED: bool = cfg!(feature = "preload");

/// Whether the context manager keeps finished contexts for reuse
/// (cargo feature `context-cache`).
pub const CONTEXT_CACHE_ENABLED: bool = cfg!(feature = "context-cache");

/// Local-file fingerprint configuration.
///
/// Files up to `full_hash_limit_bytes` are hashed completely. Larger files are
/// identified by their size plus `sample_blocks` evenly spaced blocks of
/// `sample_block_bytes` each, always including the first and last block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Largest file (in bytes) hashed in full.
    ///
    /// Default: 4 MiB.
    #[serde(default = "default_full_hash_limit_bytes")]
    pub full_hash_limit_bytes: u64,

    /// Number of sampled blocks for larger files.
    ///
    /// Default: 8.
    #[serde(default = "default_sample_blocks")]
    pub sample_blocks: usize,

    /// Size of each sampled block in bytes.
    ///
    /// Default: 64 KiB.
    #[serde(default = "default_sample_block_bytes")]
    pub sample_block_bytes: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            full_hash_limit_bytes: default_full_hash_limit_bytes(),
            sample_blocks: default_sample_blocks(),
            sample_block_bytes: default_sample_block_bytes(),
        }
    }
}

impl FingerprintConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_blocks == 0 {
            return Err("sample_blocks must be > 0".to_string());
        }

        if self.sample_block_bytes == 0 {
            return Err("sample_block_bytes must be > 0".to_string());
        }

        // Sampling must never read less than a full hash would have.
        let sampled = (self.sample_blocks as u64).saturating_mul(self.sample_block_bytes as u64);
        if sampled > self.full_hash_limit_bytes {
            return Err(
                "sample_blocks * sample_block_bytes cannot exceed full_hash_limit_bytes"
                    .to_string(),
            );
        }

        Ok(())
    }
}

fn default_full_hash_limit_bytes() -> u64 {
    4 * 1024 * 1024 // 4 MiB
}

fn default_sample_blocks() -> usize {
    8
}

fn default_sample_block_bytes() -> usize {
    64 * 1024 // 64 KiB
}
