//! Association store errors

use thiserror::Error;

use crate::journal::JournalError;

pub type AssociationResult<T> = Result<T, AssociationError>;

#[derive(Debug, Error)]
pub enum AssociationError {
    #[error("Undecodable association record at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl AssociationError {
    pub fn code(&self) -> &'static str {
        match self {
            AssociationError::Corrupt { .. } => "MULTIREV_ASSOCIATION_CORRUPT",
            AssociationError::Journal(e) => e.code().code(),
        }
    }
}
