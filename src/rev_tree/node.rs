//! Tree node

use serde::Serialize;

use crate::rev_index::{IndexEntry, RevisionStatus};
use crate::revision::{RevisionId, WorkspaceId};

/// One live revision inside a [`RevisionTree`](super::RevisionTree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionNode {
    pub revision: RevisionId,
    pub parent: Option<RevisionId>,
    pub workspace: WorkspaceId,
    pub deleted: bool,
    pub status: RevisionStatus,
    /// Child revisions, ordered by revision id
    pub children: Vec<RevisionId>,
}

impl RevisionNode {
    pub(crate) fn from_entry(entry: IndexEntry) -> Self {
        Self {
            revision: entry.revision,
            parent: entry.parent,
            workspace: entry.workspace,
            deleted: entry.deleted,
            status: entry.status,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == RevisionStatus::Available
    }
}
