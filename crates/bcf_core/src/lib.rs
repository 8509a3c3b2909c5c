//! BCF (BIM Collaboration Format) container codec.
//!
//! Reads a BCF zip archive into an insertion-ordered registry of topics and
//! writes such a registry back into an archive third-party readers accept.
//! Markup and viewpoint documents are handled through the `BcfDocument`
//! collaborator seam; snapshots are raw bytes.

pub mod archive;
pub mod config;
pub mod logging;
pub mod model;
pub mod registry;

pub use archive::{
    load, resolve_entry_path, save, ArchiveReadError, ArchiveWriteError, ArtifactRole,
    BcfArchive, BcfRegistry, BcfTopic, CodecWarning, EntryPath, LoadOutcome, SaveOutcome,
    MARKUP_FILE_NAME, SNAPSHOT_FILE_NAME, VIEWPOINT_FILE_NAME,
};
pub use config::CodecOptions;
pub use logging::{init_logging, logging_status, LogConfig, LogLevel, LoggingError};
pub use model::document::{BcfDocument, DocumentError, MarkupDocument, VisualizationInfoDocument};
pub use model::topic::TopicRecord;
pub use registry::{RegistryError, TopicRegistry};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
