//! Entity stores.
//!
//! A store is a keyed collection with update-by-id semantics. It applies
//! patches the lifecycle engine produced and never decides what a patch
//! should contain. The in-memory store is mock application state: it starts
//! from a seed and is gone when the process exits.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Complaint, ComplaintId, ComplaintPatch, Project, ProjectId, ProjectPatch};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Which entity table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Complaint,
    Project,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Complaint => "complaint",
            EntityKind::Project => "project",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A keyed record that accepts patches.
pub trait Record: Clone {
    type Id: Copy + Eq + Hash + std::fmt::Debug + std::fmt::Display;
    type Patch;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;

    fn uuid(&self) -> Uuid;

    fn apply(&mut self, patch: Self::Patch);
}

impl Record for Complaint {
    type Id = ComplaintId;
    type Patch = ComplaintPatch;

    const KIND: EntityKind = EntityKind::Complaint;

    fn id(&self) -> ComplaintId {
        self.id
    }

    fn uuid(&self) -> Uuid {
        self.id.0
    }

    fn apply(&mut self, patch: ComplaintPatch) {
        Complaint::apply(self, patch);
    }
}

impl Record for Project {
    type Id = ProjectId;
    type Patch = ProjectPatch;

    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> ProjectId {
        self.id
    }

    fn uuid(&self) -> Uuid {
        self.id.0
    }

    fn apply(&mut self, patch: ProjectPatch) {
        Project::apply(self, patch);
    }
}

// ---------------------------------------------------------------------------
// Store interface
// ---------------------------------------------------------------------------

/// Keyed collection of one entity type.
pub trait EntityStore<E: Record> {
    /// Get a record by ID.
    fn get(&self, id: E::Id) -> Result<E>;

    /// Merge a patch into a record. Returns the updated record.
    fn update(&mut self, id: E::Id, patch: E::Patch) -> Result<E>;

    /// All records, in insertion order.
    fn list(&self) -> Vec<E>;

    /// Add a new record. Fails if the ID is taken.
    fn insert(&mut self, entity: E) -> Result<()>;

    /// Physically delete a record.
    fn remove(&mut self, id: E::Id) -> Result<E>;

    /// Find the single record whose UUID starts with `prefix`.
    fn find_by_prefix(&self, prefix: &str) -> Result<E> {
        let prefix = prefix.trim().to_ascii_lowercase();
        let mut found: Vec<E> = self
            .list()
            .into_iter()
            .filter(|e| e.uuid().to_string().starts_with(&prefix))
            .collect();

        match found.len() {
            0 => Err(Error::NotFound {
                kind: E::KIND.as_str(),
                id: prefix,
            }),
            1 => Ok(found.remove(0)),
            matches => Err(Error::AmbiguousId {
                kind: E::KIND.as_str(),
                prefix,
                matches,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store backed by a hash map plus an insertion-order index.
#[derive(Debug, Clone)]
pub struct InMemoryStore<E: Record> {
    records: HashMap<E::Id, E>,
    order: Vec<E::Id>,
}

impl<E: Record> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<E: Record> InMemoryStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records. Fails on duplicate IDs.
    pub fn from_records(records: impl IntoIterator<Item = E>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn not_found(id: E::Id) -> Error {
        Error::NotFound {
            kind: E::KIND.as_str(),
            id: id.to_string(),
        }
    }
}

impl<E: Record> EntityStore<E> for InMemoryStore<E> {
    fn get(&self, id: E::Id) -> Result<E> {
        self.records
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    fn update(&mut self, id: E::Id, patch: E::Patch) -> Result<E> {
        let record = self.records.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        record.apply(patch);
        Ok(record.clone())
    }

    fn list(&self) -> Vec<E> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    fn insert(&mut self, entity: E) -> Result<()> {
        let id = entity.id();
        if self.records.contains_key(&id) {
            return Err(Error::Duplicate {
                kind: E::KIND.as_str(),
                id: entity.uuid().to_string(),
            });
        }
        self.records.insert(id, entity);
        self.order.push(id);
        Ok(())
    }

    fn remove(&mut self, id: E::Id) -> Result<E> {
        let record = self.records.remove(&id).ok_or_else(|| Self::not_found(id))?;
        self.order.retain(|existing| *existing != id);
        Ok(record)
    }
}
