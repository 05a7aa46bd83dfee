//! In-memory revision index

use super::state::{IndexState, PutPlan};
use super::{IndexEntry, IndexResult, RevisionIndex};
use crate::revision::{DocumentId, RevisionId};

/// Revision index kept entirely in memory.
///
/// Used by tests and by callers that persist the index elsewhere.
#[derive(Debug, Default)]
pub struct MemoryRevisionIndex {
    state: IndexState,
}

impl MemoryRevisionIndex {
    pub fn new() -> Self {
        Self {
            state: IndexState::new(),
        }
    }

    /// Total number of entries across all documents.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RevisionIndex for MemoryRevisionIndex {
    fn put(&mut self, entry: IndexEntry) -> IndexResult<()> {
        if self.state.plan(&entry)? != PutPlan::Unchanged {
            self.state.apply(entry);
        }
        Ok(())
    }

    fn get(&self, document: &DocumentId, revision: &RevisionId) -> IndexResult<IndexEntry> {
        self.state.get(document, revision)
    }

    fn list_for_document(&self, document: &DocumentId) -> IndexResult<Vec<IndexEntry>> {
        Ok(self.state.list_for_document(document))
    }

    fn documents(&self) -> IndexResult<Vec<DocumentId>> {
        Ok(self.state.documents())
    }
}
