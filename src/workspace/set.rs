//! Two-way membership set

use std::collections::{BTreeMap, BTreeSet};

use crate::revision::{DocumentId, WorkspaceId};

/// Entity → workspaces and workspace → entities, kept in step.
#[derive(Debug, Default)]
pub(crate) struct AssociationSet {
    by_entity: BTreeMap<DocumentId, BTreeSet<WorkspaceId>>,
    by_workspace: BTreeMap<WorkspaceId, BTreeSet<DocumentId>>,
}

impl AssociationSet {
    pub(crate) fn contains(&self, entity: &DocumentId, workspace: &WorkspaceId) -> bool {
        self.by_entity
            .get(entity)
            .map(|ws| ws.contains(workspace))
            .unwrap_or(false)
    }

    /// Returns true if the pair was not present.
    pub(crate) fn insert(&mut self, entity: DocumentId, workspace: WorkspaceId) -> bool {
        let inserted = self
            .by_entity
            .entry(entity)
            .or_default()
            .insert(workspace.clone());
        self.by_workspace.entry(workspace).or_default().insert(entity);
        inserted
    }

    pub(crate) fn workspaces_of(&self, entity: &DocumentId) -> BTreeSet<WorkspaceId> {
        self.by_entity.get(entity).cloned().unwrap_or_default()
    }

    pub(crate) fn entities_of(&self, workspace: &WorkspaceId) -> BTreeSet<DocumentId> {
        self.by_workspace.get(workspace).cloned().unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_entity.values().map(BTreeSet::len).sum()
    }
}
