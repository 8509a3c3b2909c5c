//! Codec options.
//!
//! # Invariants
//! - Every field has a default, so a partial options file is valid.
//! - `compression_level` is clamped to the deflate range at use time.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Highest deflate level; also the default, matching what BCF tools emit.
pub const MAX_COMPRESSION_LEVEL: i64 = 9;

/// Behavior switches for archive load and save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    /// Parent directory for staged entries and per-topic scratch directories.
    /// `None` uses the OS temp directory.
    pub scratch_root: Option<PathBuf>,
    /// Deflate level, 0..=9. Level 0 stores entries uncompressed.
    pub compression_level: i64,
    /// Abort `save` when a collaborator fails instead of recording a warning.
    pub strict_collaborators: bool,
    /// Keep unrecognized topic files on load so they are written back on save.
    pub retain_sidecars: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            scratch_root: None,
            compression_level: MAX_COMPRESSION_LEVEL,
            strict_collaborators: false,
            retain_sidecars: false,
        }
    }
}

impl CodecOptions {
    /// Effective scratch parent directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Deflate level clamped to 0..=9.
    pub fn effective_compression_level(&self) -> i64 {
        self.compression_level.clamp(0, MAX_COMPRESSION_LEVEL)
    }
}
