//! In-memory association store

use std::collections::BTreeSet;

use super::set::AssociationSet;
use super::{AssociationResult, WorkspaceAssociationStore};
use crate::revision::{DocumentId, WorkspaceId};

#[derive(Debug, Default)]
pub struct MemoryAssociationStore {
    set: AssociationSet,
}

impl MemoryAssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (entity, workspace) pairs.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WorkspaceAssociationStore for MemoryAssociationStore {
    fn track(&mut self, entity: &DocumentId, workspace: &WorkspaceId) -> AssociationResult<bool> {
        Ok(self.set.insert(*entity, workspace.clone()))
    }

    fn tracking_workspace_ids(&self, entity: &DocumentId) -> AssociationResult<BTreeSet<WorkspaceId>> {
        Ok(self.set.workspaces_of(entity))
    }

    fn tracked_entities(&self, workspace: &WorkspaceId) -> AssociationResult<BTreeSet<DocumentId>> {
        Ok(self.set.entities_of(workspace))
    }
}
