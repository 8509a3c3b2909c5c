//! Insertion-ordered topic registry keyed by group identifier.
//!
//! # Invariants
//! - No two records share a `group_id`.
//! - Iteration yields records in first-insertion order.
//! - Membership only grows; there is no removal.

use crate::model::document::BcfDocument;
use crate::model::topic::TopicRecord;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Registry insertion errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateGroupId(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateGroupId(value) => write!(f, "topic group id already registered: {value}"),
        }
    }
}

impl Error for RegistryError {}

/// Topic records owned by one load or authoring session.
#[derive(Debug, Clone)]
pub struct TopicRegistry<M, V> {
    records: Vec<TopicRecord<M, V>>,
    index: HashMap<String, usize>,
}

impl<M, V> Default for TopicRegistry<M, V> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<M, V> TopicRegistry<M, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `group_id`, appending an empty one first when absent.
    ///
    /// Repeated calls with the same id never add a second record.
    pub fn find_or_create(&mut self, group_id: &str) -> &mut TopicRecord<M, V> {
        let existing = self.index.get(group_id).copied();
        let position = match existing {
            Some(position) => position,
            None => self.push(TopicRecord::new(group_id)),
        };
        &mut self.records[position]
    }

    /// Adds a fully built record.
    pub fn insert(&mut self, record: TopicRecord<M, V>) -> Result<(), RegistryError> {
        if self.index.contains_key(record.group_id()) {
            return Err(RegistryError::DuplicateGroupId(
                record.group_id().to_string(),
            ));
        }
        self.push(record);
        Ok(())
    }

    pub fn get(&self, group_id: &str) -> Option<&TopicRecord<M, V>> {
        self.index.get(group_id).map(|position| &self.records[*position])
    }

    pub fn get_mut(&mut self, group_id: &str) -> Option<&mut TopicRecord<M, V>> {
        let position = *self.index.get(group_id)?;
        Some(&mut self.records[position])
    }

    pub fn contains(&self, group_id: &str) -> bool {
        self.index.contains_key(group_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, TopicRecord<M, V>> {
        self.records.iter()
    }

    /// Group ids in insertion order.
    pub fn group_ids(&self) -> Vec<&str> {
        self.records.iter().map(TopicRecord::group_id).collect()
    }

    fn push(&mut self, record: TopicRecord<M, V>) -> usize {
        let position = self.records.len();
        self.index.insert(record.group_id().to_string(), position);
        self.records.push(record);
        position
    }
}

impl<M: BcfDocument, V: BcfDocument> TopicRegistry<M, V> {
    /// Starts a new authored topic under a freshly generated GUID.
    pub fn create_topic(&mut self) -> &mut TopicRecord<M, V> {
        let mut group_id = Uuid::new_v4().to_string();
        while self.index.contains_key(group_id.as_str()) {
            group_id = Uuid::new_v4().to_string();
        }
        let position = self.push(TopicRecord::authored(group_id));
        &mut self.records[position]
    }
}

impl<'a, M, V> IntoIterator for &'a TopicRegistry<M, V> {
    type Item = &'a TopicRecord<M, V>;
    type IntoIter = std::slice::Iter<'a, TopicRecord<M, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
