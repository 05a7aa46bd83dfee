//! In-memory index state shared by the memory and file implementations
//!
//! Validation happens in `plan`, which never mutates. Implementations make
//! the change durable (if they persist at all) and only then `apply` it.

use std::collections::BTreeMap;

use super::{IndexEntry, IndexError, IndexResult};
use crate::revision::{DocumentId, RevisionId};

/// What a validated `put` will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PutPlan {
    /// New entry
    Insert,
    /// Existing entry, new status
    StatusChange,
    /// Existing entry, same status
    Unchanged,
}

#[derive(Debug, Default)]
pub(crate) struct IndexState {
    documents: BTreeMap<DocumentId, BTreeMap<RevisionId, IndexEntry>>,
}

impl IndexState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Validates `entry` against the current state.
    pub(crate) fn plan(&self, entry: &IndexEntry) -> IndexResult<PutPlan> {
        if let Some(existing) = self.lookup(&entry.document, &entry.revision) {
            if !existing.same_revision_as(entry) {
                return Err(IndexError::LineageMismatch {
                    document: entry.document,
                    revision: entry.revision.clone(),
                });
            }
            if existing.status == entry.status {
                return Ok(PutPlan::Unchanged);
            }
            if !existing.status.can_transition_to(entry.status) {
                return Err(IndexError::IllegalTransition {
                    document: entry.document,
                    revision: entry.revision.clone(),
                    from: existing.status,
                    to: entry.status,
                });
            }
            return Ok(PutPlan::StatusChange);
        }

        match &entry.parent {
            None => {
                if !entry.revision.is_root() {
                    return Err(IndexError::GenerationMismatch {
                        revision: entry.revision.clone(),
                    });
                }
            }
            Some(parent) => {
                if parent.generation().checked_add(1) != Some(entry.revision.generation()) {
                    return Err(IndexError::GenerationMismatch {
                        revision: entry.revision.clone(),
                    });
                }
                let parent_indexed = self
                    .lookup(&entry.document, parent)
                    .map(|p| p.workspace == entry.workspace)
                    .unwrap_or(false);
                if !parent_indexed {
                    return Err(IndexError::MissingParent {
                        document: entry.document,
                        revision: entry.revision.clone(),
                        parent: parent.clone(),
                        workspace: entry.workspace.to_string(),
                    });
                }
            }
        }
        Ok(PutPlan::Insert)
    }

    /// Stores `entry` unconditionally. Callers validate with `plan` first;
    /// journal replay applies records as found (latest wins).
    pub(crate) fn apply(&mut self, entry: IndexEntry) {
        self.documents
            .entry(entry.document)
            .or_default()
            .insert(entry.revision.clone(), entry);
    }

    pub(crate) fn lookup(&self, document: &DocumentId, revision: &RevisionId) -> Option<&IndexEntry> {
        self.documents.get(document).and_then(|revs| revs.get(revision))
    }

    pub(crate) fn get(&self, document: &DocumentId, revision: &RevisionId) -> IndexResult<IndexEntry> {
        self.lookup(document, revision)
            .cloned()
            .ok_or_else(|| IndexError::NotFound {
                document: *document,
                revision: revision.clone(),
            })
    }

    pub(crate) fn list_for_document(&self, document: &DocumentId) -> Vec<IndexEntry> {
        self.documents
            .get(document)
            .map(|revs| revs.values().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn documents(&self) -> Vec<DocumentId> {
        self.documents.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.values().map(BTreeMap::len).sum()
    }
}
