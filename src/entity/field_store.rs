//! Field value persistence
//!
//! The storage never interprets payloads. It hands them to a `FieldStore`
//! keyed by `(workspace, document, revision)` and reads them back the same
//! way.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::revision::{DocumentId, RevisionId, WorkspaceId};

#[derive(Debug, Error)]
pub enum FieldStoreError {
    #[error("No fields stored for revision {revision} of {document}")]
    NotFound {
        document: DocumentId,
        revision: RevisionId,
    },

    /// Backend refused or failed the write
    #[error("{0}")]
    Rejected(String),
}

pub type FieldStoreResult<T> = Result<T, FieldStoreError>;

/// Workspace-partitioned store for revision payloads.
pub trait FieldStore {
    fn write_fields(
        &mut self,
        document: &DocumentId,
        revision: &RevisionId,
        workspace: &WorkspaceId,
        payload: &Value,
    ) -> FieldStoreResult<()>;

    fn read_fields(
        &self,
        document: &DocumentId,
        revision: &RevisionId,
        workspace: &WorkspaceId,
    ) -> FieldStoreResult<Value>;
}

type FieldKey = (DocumentId, RevisionId);

/// Reference field store: one map per workspace.
#[derive(Debug, Default)]
pub struct MemoryFieldStore {
    partitions: HashMap<WorkspaceId, HashMap<FieldKey, Value>>,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads stored in `workspace`.
    pub fn len_in(&self, workspace: &WorkspaceId) -> usize {
        self.partitions.get(workspace).map_or(0, HashMap::len)
    }
}

impl FieldStore for MemoryFieldStore {
    fn write_fields(
        &mut self,
        document: &DocumentId,
        revision: &RevisionId,
        workspace: &WorkspaceId,
        payload: &Value,
    ) -> FieldStoreResult<()> {
        self.partitions
            .entry(workspace.clone())
            .or_default()
            .insert((*document, revision.clone()), payload.clone());
        Ok(())
    }

    fn read_fields(
        &self,
        document: &DocumentId,
        revision: &RevisionId,
        workspace: &WorkspaceId,
    ) -> FieldStoreResult<Value> {
        self.partitions
            .get(workspace)
            .and_then(|p| p.get(&(*document, revision.clone())))
            .cloned()
            .ok_or_else(|| FieldStoreError::NotFound {
                document: *document,
                revision: revision.clone(),
            })
    }
}
