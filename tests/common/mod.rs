//! Shared helpers for integration tests

#![allow(dead_code)]

use multirev::entity::{FieldStore, FieldStoreError, FieldStoreResult, MemoryFieldStore};
use multirev::{DocumentId, RevisionId, WorkspaceId};
use serde_json::Value;

/// Field store that refuses writes while `failing` is set.
#[derive(Debug, Default)]
pub struct FlakyFieldStore {
    pub inner: MemoryFieldStore,
    pub failing: bool,
}

impl FieldStore for FlakyFieldStore {
    fn write_fields(
        &mut self,
        document: &DocumentId,
        revision: &RevisionId,
        workspace: &WorkspaceId,
        payload: &Value,
    ) -> FieldStoreResult<()> {
        if self.failing {
            return Err(FieldStoreError::Rejected("disk full".to_string()));
        }
        self.inner.write_fields(document, revision, workspace, payload)
    }

    fn read_fields(
        &self,
        document: &DocumentId,
        revision: &RevisionId,
        workspace: &WorkspaceId,
    ) -> FieldStoreResult<Value> {
        self.inner.read_fields(document, revision, workspace)
    }
}

pub fn ws(id: &str) -> WorkspaceId {
    WorkspaceId::new(id).unwrap()
}

pub fn generations(branch: &[RevisionId]) -> Vec<u32> {
    branch.iter().map(RevisionId::generation).collect()
}
