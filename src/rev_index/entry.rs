//! Index entry and status types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::revision::{DocumentId, RevisionId, WorkspaceId};

/// Durability status of an indexed revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionStatus {
    /// Write intent recorded; field write not yet confirmed
    Pending,
    /// Field write confirmed; content exists
    Available,
    /// Abandoned write; excluded from the tree but kept for audit
    Orphaned,
}

impl RevisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionStatus::Pending => "pending",
            RevisionStatus::Available => "available",
            RevisionStatus::Orphaned => "orphaned",
        }
    }

    /// Stable on-disk tag.
    pub(crate) fn tag(&self) -> u8 {
        match self {
            RevisionStatus::Pending => 1,
            RevisionStatus::Available => 2,
            RevisionStatus::Orphaned => 3,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(RevisionStatus::Pending),
            2 => Some(RevisionStatus::Available),
            3 => Some(RevisionStatus::Orphaned),
            _ => None,
        }
    }

    /// Returns true if the revision takes part in the revision tree.
    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self, RevisionStatus::Pending | RevisionStatus::Available)
    }

    /// Returns true if moving from `self` to `next` is permitted.
    ///
    /// `available` is terminal. An orphaned write that later completes is
    /// revived straight to `available`; it never goes back to `pending`.
    pub fn can_transition_to(&self, next: RevisionStatus) -> bool {
        use RevisionStatus::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (Pending, Available) | (Pending, Orphaned) => true,
            (Orphaned, Available) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One revision as recorded in the index.
///
/// Everything except `status` is fixed when the entry is first written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub document: DocumentId,
    pub revision: RevisionId,
    /// None for a root revision
    pub parent: Option<RevisionId>,
    pub workspace: WorkspaceId,
    /// True for a tombstone
    pub deleted: bool,
    pub status: RevisionStatus,
}

impl IndexEntry {
    /// Creates a `pending` entry, the first state of every revision.
    pub fn pending(
        document: DocumentId,
        revision: RevisionId,
        parent: Option<RevisionId>,
        workspace: WorkspaceId,
        deleted: bool,
    ) -> Self {
        Self {
            document,
            revision,
            parent,
            workspace,
            deleted,
            status: RevisionStatus::Pending,
        }
    }

    /// Returns a copy with a different status.
    pub fn with_status(mut self, status: RevisionStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns true if the immutable parts of both entries agree.
    pub fn same_revision_as(&self, other: &IndexEntry) -> bool {
        self.document == other.document
            && self.revision == other.revision
            && self.parent == other.parent
            && self.workspace == other.workspace
            && self.deleted == other.deleted
    }
}
