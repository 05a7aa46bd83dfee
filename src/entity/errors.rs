//! Entity storage errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::rev_index::IndexError;
use crate::revision::{DocumentId, RevisionId, RevisionIdError, WorkspaceId};
use crate::workspace::AssociationError;

pub type EntityResult<T> = Result<T, EntityStorageError>;

#[derive(Debug, Error)]
pub enum EntityStorageError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity {entity} not found in workspace '{workspace}': {reason}")]
    NotFound {
        entity: DocumentId,
        workspace: WorkspaceId,
        reason: String,
    },

    /// The field store refused the write. The revision stays `pending`.
    #[error("Failed to persist revision {revision} of entity {entity}: {message}")]
    PersistenceFailure {
        entity: DocumentId,
        revision: RevisionId,
        message: String,
    },

    #[error("Revision {revision} of entity {entity} belongs to workspace '{owner}', not '{requested}'")]
    WorkspaceIsolationViolation {
        entity: DocumentId,
        revision: RevisionId,
        owner: WorkspaceId,
        requested: WorkspaceId,
    },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Association(#[from] AssociationError),

    #[error(transparent)]
    Revision(#[from] RevisionIdError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EntityStorageError {
    pub(crate) fn not_found(
        entity: DocumentId,
        workspace: &WorkspaceId,
        reason: impl Into<String>,
    ) -> Self {
        EntityStorageError::NotFound {
            entity,
            workspace: workspace.clone(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EntityStorageError::Validation(_) => "MULTIREV_ENTITY_VALIDATION",
            EntityStorageError::NotFound { .. } => "MULTIREV_ENTITY_NOT_FOUND",
            EntityStorageError::PersistenceFailure { .. } => "MULTIREV_ENTITY_PERSISTENCE_FAILURE",
            EntityStorageError::WorkspaceIsolationViolation { .. } => {
                "MULTIREV_ENTITY_WORKSPACE_ISOLATION"
            }
            EntityStorageError::Index(e) => e.code(),
            EntityStorageError::Association(e) => e.code(),
            EntityStorageError::Revision(_) => "MULTIREV_ENTITY_INVALID_REVISION",
            EntityStorageError::Config(e) => e.code(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EntityStorageError::NotFound { .. })
    }
}
