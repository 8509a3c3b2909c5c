//! Topic domain model for BCF collaboration archives.
//!
//! # Responsibility
//! - Define the per-topic record reconstructed from (and written to) an archive.
//! - Define the collaborator seam used to load and save markup/viewpoint documents.
//!
//! # Invariants
//! - A topic is identified by an opaque `group_id`; no format is assumed.
//! - Every artifact of a topic may be absent; partial topics are valid.

pub mod document;
pub mod topic;
