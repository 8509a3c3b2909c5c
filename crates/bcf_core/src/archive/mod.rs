//! BCF container codec.
//!
//! # Responsibility
//! - Rebuild a `TopicRegistry` from a BCF zip archive (`load`).
//! - Write a `TopicRegistry` back into a conformant archive (`save`).
//!
//! # Invariants
//! - Only archive-level open/create/finalize failures are returned as `Err`.
//! - Per-entry and per-topic problems become `CodecWarning`s next to the result.
//! - Scratch files and directories never outlive the call that created them.
//! - Topics are written in registry insertion order.

pub mod entry_path;
mod reader;
mod scratch;
mod writer;

use crate::config::CodecOptions;
use crate::model::document::{BcfDocument, MarkupDocument, VisualizationInfoDocument};
use crate::model::topic::TopicRecord;
use crate::registry::TopicRegistry;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use zip::result::ZipError;

pub use entry_path::{
    resolve_entry_path, ArtifactRole, EntryPath, MARKUP_FILE_NAME, SNAPSHOT_FILE_NAME,
    VIEWPOINT_FILE_NAME,
};

/// Topic record using the bundled opaque XML collaborators.
pub type BcfTopic = TopicRecord<MarkupDocument, VisualizationInfoDocument>;
/// Registry using the bundled opaque XML collaborators.
pub type BcfRegistry = TopicRegistry<MarkupDocument, VisualizationInfoDocument>;

/// Fatal failure while opening an archive for `load`.
#[derive(Debug)]
pub enum ArchiveReadError {
    /// The archive file is missing or unreadable.
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is not a readable zip container.
    InvalidContainer { path: PathBuf, source: ZipError },
}

impl Display for ArchiveReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open BCF archive `{}`: {source}", path.display())
            }
            Self::InvalidContainer { path, source } => {
                write!(f, "`{}` is not a valid BCF container: {source}", path.display())
            }
        }
    }
}

impl Error for ArchiveReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::InvalidContainer { source, .. } => Some(source),
        }
    }
}

/// Fatal failure while producing an archive in `save`.
#[derive(Debug)]
pub enum ArchiveWriteError {
    /// The destination file cannot be created.
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writing one entry into the zip stream failed.
    Entry { entry_name: String, source: ZipError },
    /// Writing the central directory or flushing the file failed.
    Finalize { path: PathBuf, source: ZipError },
    /// A collaborator save failed while `strict_collaborators` is on.
    CollaboratorSave {
        group_id: String,
        role: &'static str,
        source: crate::model::document::DocumentError,
    },
}

impl Display for ArchiveWriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create { path, source } => {
                write!(f, "cannot create BCF archive `{}`: {source}", path.display())
            }
            Self::Entry { entry_name, source } => {
                write!(f, "failed to write archive entry `{entry_name}`: {source}")
            }
            Self::Finalize { path, source } => {
                write!(f, "failed to finalize BCF archive `{}`: {source}", path.display())
            }
            Self::CollaboratorSave {
                group_id,
                role,
                source,
            } => write!(f, "failed to save {role} for topic `{group_id}`: {source}"),
        }
    }
}

impl Error for ArchiveWriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Create { source, .. } => Some(source),
            Self::Entry { source, .. } => Some(source),
            Self::Finalize { source, .. } => Some(source),
            Self::CollaboratorSave { source, .. } => Some(source),
        }
    }
}

/// Non-fatal problem recorded during `load` or `save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecWarning {
    /// An entry could not be extracted to scratch storage and was skipped.
    EntryStage { entry_name: String, message: String },
    /// A markup/viewpoint document failed to parse; the field is left absent.
    CollaboratorLoad {
        group_id: String,
        role: &'static str,
        message: String,
    },
    /// Snapshot bytes could not be read back from scratch storage.
    SnapshotRead { group_id: String, message: String },
    /// A markup/viewpoint document failed to serialize; the file is omitted.
    CollaboratorSave {
        group_id: String,
        role: &'static str,
        message: String,
    },
    /// A topic file could not be staged for writing and is omitted.
    TopicStage { group_id: String, message: String },
    /// A sidecar name would escape the topic folder or clobber a known file.
    SidecarRejected { group_id: String, inner_name: String },
    /// A topic folder held no recognized artifact.
    EmptyTopic { group_id: String },
    /// A scratch file or directory could not be removed.
    ScratchCleanup { path: PathBuf, message: String },
}

impl CodecWarning {
    /// Stable event name used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EntryStage { .. } => "entry_stage_failed",
            Self::CollaboratorLoad { .. } => "collaborator_load_failed",
            Self::SnapshotRead { .. } => "snapshot_read_failed",
            Self::CollaboratorSave { .. } => "collaborator_save_failed",
            Self::TopicStage { .. } => "topic_stage_failed",
            Self::SidecarRejected { .. } => "sidecar_rejected",
            Self::EmptyTopic { .. } => "empty_topic",
            Self::ScratchCleanup { .. } => "scratch_cleanup_failed",
        }
    }

    /// Topic concerned by this warning, when there is one.
    pub fn group_id(&self) -> Option<&str> {
        match self {
            Self::CollaboratorLoad { group_id, .. }
            | Self::SnapshotRead { group_id, .. }
            | Self::CollaboratorSave { group_id, .. }
            | Self::TopicStage { group_id, .. }
            | Self::SidecarRejected { group_id, .. }
            | Self::EmptyTopic { group_id } => Some(group_id),
            Self::EntryStage { .. } | Self::ScratchCleanup { .. } => None,
        }
    }
}

impl Display for CodecWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryStage {
                entry_name,
                message,
            } => write!(f, "skipped entry `{entry_name}`: {message}"),
            Self::CollaboratorLoad {
                group_id,
                role,
                message,
            } => write!(f, "topic `{group_id}` has unreadable {role}: {message}"),
            Self::SnapshotRead { group_id, message } => {
                write!(f, "topic `{group_id}` has unreadable snapshot: {message}")
            }
            Self::CollaboratorSave {
                group_id,
                role,
                message,
            } => write!(f, "topic `{group_id}` {role} was not saved: {message}"),
            Self::TopicStage { group_id, message } => {
                write!(f, "topic `{group_id}` could not be staged: {message}")
            }
            Self::SidecarRejected {
                group_id,
                inner_name,
            } => write!(f, "topic `{group_id}` sidecar `{inner_name}` was rejected"),
            Self::EmptyTopic { group_id } => {
                write!(f, "topic `{group_id}` has no recognized artifacts")
            }
            Self::ScratchCleanup { path, message } => {
                write!(f, "scratch path `{}` was not removed: {message}", path.display())
            }
        }
    }
}

/// Result of a `load`: the rebuilt registry plus everything that degraded.
#[derive(Debug, Clone)]
pub struct LoadOutcome<M, V> {
    pub registry: TopicRegistry<M, V>,
    pub warnings: Vec<CodecWarning>,
}

impl<M, V> LoadOutcome<M, V> {
    /// Distinct topics that carry at least one warning, in first-warning order.
    pub fn degraded_topics(&self) -> Vec<&str> {
        degraded_topics(&self.warnings)
    }
}

/// Result of a `save`: entry names in archive order plus warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub entries_written: Vec<String>,
    pub warnings: Vec<CodecWarning>,
}

impl SaveOutcome {
    pub fn degraded_topics(&self) -> Vec<&str> {
        degraded_topics(&self.warnings)
    }
}

fn degraded_topics(warnings: &[CodecWarning]) -> Vec<&str> {
    let mut topics: Vec<&str> = Vec::new();
    for group_id in warnings.iter().filter_map(CodecWarning::group_id) {
        if !topics.contains(&group_id) {
            topics.push(group_id);
        }
    }
    topics
}

pub(crate) fn push_warning(warnings: &mut Vec<CodecWarning>, warning: CodecWarning) {
    warn!(
        "event={} module=archive status=degraded group_id={} detail={}",
        warning.code(),
        warning.group_id().unwrap_or("-"),
        warning
    );
    warnings.push(warning);
}

/// Codec bound to one pair of collaborator types and one set of options.
#[derive(Debug, Clone)]
pub struct BcfArchive<M, V> {
    options: CodecOptions,
    _documents: PhantomData<fn() -> (M, V)>,
}

impl<M, V> Default for BcfArchive<M, V> {
    fn default() -> Self {
        Self::new(CodecOptions::default())
    }
}

impl<M, V> BcfArchive<M, V> {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            options,
            _documents: PhantomData,
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }
}

impl<M: BcfDocument, V: BcfDocument> BcfArchive<M, V> {
    /// Reads every topic from the archive at `archive_path`.
    ///
    /// # Errors
    /// - `ArchiveReadError` when the file cannot be opened or is not a zip container.
    pub fn load(
        &self,
        archive_path: impl AsRef<Path>,
    ) -> Result<LoadOutcome<M, V>, ArchiveReadError> {
        reader::read_archive(archive_path.as_ref(), &self.options)
    }

    /// Writes every topic of `registry` into a new archive at `archive_path`.
    ///
    /// A failed save removes the partially written archive.
    ///
    /// # Errors
    /// - `ArchiveWriteError` when the destination cannot be created, the zip
    ///   stream fails, or a collaborator fails under `strict_collaborators`.
    pub fn save(
        &self,
        registry: &TopicRegistry<M, V>,
        archive_path: impl AsRef<Path>,
    ) -> Result<SaveOutcome, ArchiveWriteError> {
        writer::write_archive(registry, archive_path.as_ref(), &self.options)
    }
}

/// Loads an archive with the bundled collaborators and default options.
pub fn load(
    archive_path: impl AsRef<Path>,
) -> Result<LoadOutcome<MarkupDocument, VisualizationInfoDocument>, ArchiveReadError> {
    BcfArchive::default().load(archive_path)
}

/// Saves a registry with the bundled collaborators and default options.
pub fn save(
    registry: &BcfRegistry,
    archive_path: impl AsRef<Path>,
) -> Result<SaveOutcome, ArchiveWriteError> {
    BcfArchive::default().save(registry, archive_path)
}
