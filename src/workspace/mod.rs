//! Workspace association tracking
//!
//! Records which workspaces reference which entities, independent of
//! revision history. An association is created the first time an entity is
//! saved in a workspace and is never removed by deletion: a tombstoned
//! entity still belongs to the workspace that deleted it.

mod errors;
mod file;
mod memory;
mod set;

pub use errors::{AssociationError, AssociationResult};
pub use file::{FileAssociationStore, ASSOCIATION_FILE_NAME};
pub use memory::MemoryAssociationStore;

use std::collections::BTreeSet;

use crate::revision::{DocumentId, WorkspaceId};

/// Storage seam for entity ↔ workspace membership.
pub trait WorkspaceAssociationStore {
    /// Records that `entity` is tracked by `workspace`.
    ///
    /// Returns true if the pair was new; tracking an existing pair is a no-op.
    fn track(&mut self, entity: &DocumentId, workspace: &WorkspaceId) -> AssociationResult<bool>;

    /// Workspaces that track `entity`.
    fn tracking_workspace_ids(&self, entity: &DocumentId) -> AssociationResult<BTreeSet<WorkspaceId>>;

    /// Entities tracked by `workspace`, tombstoned ones included.
    fn tracked_entities(&self, workspace: &WorkspaceId) -> AssociationResult<BTreeSet<DocumentId>>;

    fn is_tracked(&self, entity: &DocumentId, workspace: &WorkspaceId) -> AssociationResult<bool> {
        Ok(self.tracking_workspace_ids(entity)?.contains(workspace))
    }
}
