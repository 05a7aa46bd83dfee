//! Revision index errors

use thiserror::Error;

use super::RevisionStatus;
use crate::journal::JournalError;
use crate::revision::{DocumentId, RevisionId};

/// Result type for revision index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Revision {revision} of document {document} is not indexed")]
    NotFound {
        document: DocumentId,
        revision: RevisionId,
    },

    #[error("Revision {revision} of document {document} cannot move from {from} to {to}")]
    IllegalTransition {
        document: DocumentId,
        revision: RevisionId,
        from: RevisionStatus,
        to: RevisionStatus,
    },

    #[error("Revision {revision} of document {document} is already indexed with different lineage")]
    LineageMismatch {
        document: DocumentId,
        revision: RevisionId,
    },

    #[error("Parent {parent} of revision {revision} is not indexed for document {document} in workspace '{workspace}'")]
    MissingParent {
        document: DocumentId,
        revision: RevisionId,
        parent: RevisionId,
        workspace: String,
    },

    #[error("Revision {revision} has generation inconsistent with its parent")]
    GenerationMismatch { revision: RevisionId },

    #[error("Undecodable index record at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl IndexError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::NotFound { .. } => "MULTIREV_INDEX_NOT_FOUND",
            IndexError::IllegalTransition { .. } => "MULTIREV_INDEX_ILLEGAL_TRANSITION",
            IndexError::LineageMismatch { .. } => "MULTIREV_INDEX_LINEAGE_MISMATCH",
            IndexError::MissingParent { .. } => "MULTIREV_INDEX_MISSING_PARENT",
            IndexError::GenerationMismatch { .. } => "MULTIREV_INDEX_GENERATION_MISMATCH",
            IndexError::Corrupt { .. } => "MULTIREV_INDEX_CORRUPT",
            IndexError::Journal(e) => e.code().code(),
        }
    }

    /// Returns true for a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, IndexError::NotFound { .. })
    }
}
