//! Scratch storage for staged entries and per-topic write directories.
//!
//! Both kinds are backed by `tempfile` guards, so every exit path removes
//! them. Explicit release exists only to surface cleanup failures as warnings.

use super::{push_warning, CodecWarning};
use log::debug;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile, TempDir};

const STAGED_ENTRY_PREFIX: &str = "bcf-entry-";
const TOPIC_DIR_PREFIX: &str = "bcf-topic-";
const MAX_DIR_LABEL_CHARS: usize = 64;

/// Copies one entry's decompressed bytes into a fresh scratch file.
pub(crate) fn stage_entry(
    source: &mut impl Read,
    scratch_root: &Path,
) -> std::io::Result<NamedTempFile> {
    let mut staged = Builder::new()
        .prefix(STAGED_ENTRY_PREFIX)
        .tempfile_in(scratch_root)?;
    std::io::copy(source, staged.as_file_mut())?;
    staged.as_file_mut().flush()?;
    Ok(staged)
}

/// Deletes a staged file, recording a warning if the delete fails.
pub(crate) fn release_staged(staged: NamedTempFile, warnings: &mut Vec<CodecWarning>) {
    let path = staged.path().to_path_buf();
    if let Err(err) = staged.close() {
        push_warning(
            warnings,
            CodecWarning::ScratchCleanup {
                path,
                message: err.to_string(),
            },
        );
    }
}

/// All topic scratch directories created by one `save` call.
pub(crate) struct ScratchBatch {
    root: PathBuf,
    dirs: Vec<TempDir>,
}

impl ScratchBatch {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self {
            root,
            dirs: Vec::new(),
        }
    }

    /// Creates a uniquely named directory for `group_id` and returns its path.
    pub(crate) fn allocate(&mut self, group_id: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let dir = Builder::new()
            .prefix(&format!("{TOPIC_DIR_PREFIX}{}-", dir_label(group_id)))
            .tempdir_in(&self.root)?;
        let path = dir.path().to_path_buf();
        debug!(
            "event=scratch_allocate module=archive status=ok group_id={} path={}",
            group_id,
            path.display()
        );
        self.dirs.push(dir);
        Ok(path)
    }

    /// Removes every directory of the batch.
    pub(crate) fn release(self, warnings: &mut Vec<CodecWarning>) {
        for dir in self.dirs {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                push_warning(
                    warnings,
                    CodecWarning::ScratchCleanup {
                        path,
                        message: err.to_string(),
                    },
                );
            }
        }
    }
}

/// File-system-safe rendering of a group id for directory names.
fn dir_label(group_id: &str) -> String {
    let label = group_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_DIR_LABEL_CHARS)
        .collect::<String>();
    if label.is_empty() {
        "topic".to_string()
    } else {
        label
    }
}
