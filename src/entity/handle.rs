//! Entity handle

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::revision::{DocumentId, RevisionId, WorkspaceId};

/// A record as seen by one workspace at one revision.
///
/// The handle remembers the last revision it was loaded at or attempted to
/// save. After a failed save that revision is still `pending`, which is how
/// the next save recognizes a retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    entity_type: String,
    id: DocumentId,
    revision: Option<RevisionId>,
    workspace: WorkspaceId,
    deleted: bool,
    payload: Value,
    #[serde(default)]
    default_revision: bool,
}

impl Entity {
    /// A new, never saved entity with a fresh id.
    pub fn new(entity_type: impl Into<String>, workspace: WorkspaceId, payload: Value) -> Self {
        Self::with_id(entity_type, DocumentId::generate(), workspace, payload)
    }

    /// A never saved entity under a known id.
    ///
    /// Saving it in a workspace where the id has no history starts an
    /// independent root there.
    pub fn with_id(
        entity_type: impl Into<String>,
        id: DocumentId,
        workspace: WorkspaceId,
        payload: Value,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            revision: None,
            workspace,
            deleted: false,
            payload,
            default_revision: false,
        }
    }

    pub(crate) fn loaded(
        entity_type: &str,
        id: DocumentId,
        revision: RevisionId,
        workspace: WorkspaceId,
        deleted: bool,
        payload: Value,
        default_revision: bool,
    ) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            id,
            revision: Some(revision),
            workspace,
            deleted,
            payload,
            default_revision,
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Last loaded or attempted revision; `None` before the first save.
    pub fn revision(&self) -> Option<&RevisionId> {
        self.revision.as_ref()
    }

    pub fn workspace(&self) -> &WorkspaceId {
        &self.workspace
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// True when the carried revision is the one `load` resolves to in
    /// its workspace, as of the load or save that produced this handle.
    pub fn is_default_revision(&self) -> bool {
        self.default_revision
    }

    pub fn is_new(&self) -> bool {
        self.revision.is_none()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Value) {
        self.payload = payload;
    }

    pub(crate) fn set_revision(&mut self, revision: RevisionId) {
        self.revision = Some(revision);
        self.default_revision = false;
    }

    pub(crate) fn set_default_revision(&mut self, default_revision: bool) {
        self.default_revision = default_revision;
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}
