//! Topic record: one BCF collaboration issue.
//!
//! # Invariants
//! - `group_id` is unique within a registry and never rewritten after creation.
//! - Any subset of artifacts may be present.

use super::document::BcfDocument;
use std::collections::BTreeMap;

/// One topic reconstructed from, or destined for, a BCF archive folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRecord<M, V> {
    group_id: String,
    /// Markup collaborator document (`markup.bcf`).
    pub markup: Option<M>,
    /// Visualization-info collaborator document (`viewpoint.bcfv`).
    pub viewpoint: Option<V>,
    /// Raw snapshot image bytes (`snapshot.png`).
    pub snapshot: Option<Vec<u8>>,
    /// Unrecognized files keyed by inner name, kept only when sidecar retention is on.
    pub sidecars: BTreeMap<String, Vec<u8>>,
}

impl<M, V> TopicRecord<M, V> {
    /// Creates a record with every artifact absent.
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            markup: None,
            viewpoint: None,
            snapshot: None,
            sidecars: BTreeMap::new(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Number of populated artifacts, sidecars included.
    pub fn artifact_count(&self) -> usize {
        usize::from(self.markup.is_some())
            + usize::from(self.viewpoint.is_some())
            + usize::from(self.snapshot.is_some())
            + self.sidecars.len()
    }

    /// Returns whether no artifact was ever populated.
    pub fn is_empty(&self) -> bool {
        self.artifact_count() == 0
    }
}

impl<M: BcfDocument, V: BcfDocument> TopicRecord<M, V> {
    /// Creates a record for authoring, with empty markup and viewpoint documents.
    pub fn authored(group_id: impl Into<String>) -> Self {
        let mut record = Self::new(group_id);
        record.markup = Some(M::empty());
        record.viewpoint = Some(V::empty());
        record
    }
}
