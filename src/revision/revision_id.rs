//! RevisionId - Identity of one immutable revision
//!
//! A revision is identified by `(generation, hash)`:
//! - generation is the depth of the revision in its document's tree (root = 1)
//! - hash is derived from the revision's lineage and content
//!
//! The textual form is `"<generation>-<hash>"`.
//!
//! Ordering is by generation, then by hash lexicographically. This is the
//! order used to pick a winner among conflicting leaves, so it must never
//! depend on insertion order or wall-clock time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{content_hash, WorkspaceId};

/// Errors produced while constructing or parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevisionIdError {
    #[error("Malformed revision id '{0}': expected '<generation>-<hash>'")]
    Malformed(String),

    #[error("Revision generation must be at least 1")]
    ZeroGeneration,

    #[error("Revision generation overflow after {0}")]
    GenerationOverflow(u32),

    #[error("Invalid revision hash '{0}': must be non-empty lowercase alphanumeric")]
    InvalidHash(String),

    #[error("Invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("Invalid workspace id '{0}'")]
    InvalidWorkspaceId(String),
}

/// Totally ordered identity of a revision.
///
/// Field order matters: the derived `Ord` compares generation first.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RevisionId {
    generation: u32,
    hash: String,
}

impl RevisionId {
    /// Creates a revision id after validating both parts.
    pub fn new(generation: u32, hash: impl Into<String>) -> Result<Self, RevisionIdError> {
        let hash = hash.into();
        if generation == 0 {
            return Err(RevisionIdError::ZeroGeneration);
        }
        if hash.is_empty()
            || !hash
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        {
            return Err(RevisionIdError::InvalidHash(hash));
        }
        Ok(Self { generation, hash })
    }

    /// Derives the id of a new revision from its parent and content.
    ///
    /// The generation is `parent.generation + 1`, or 1 for a root.
    /// Recomputing with the same inputs always returns the same id.
    pub fn derive(
        parent: Option<&RevisionId>,
        workspace: &WorkspaceId,
        deleted: bool,
        payload: &Value,
    ) -> Result<Self, RevisionIdError> {
        let generation = match parent {
            Some(p) => p
                .generation
                .checked_add(1)
                .ok_or(RevisionIdError::GenerationOverflow(p.generation))?,
            None => 1,
        };
        Ok(Self {
            generation,
            hash: content_hash(parent, workspace, deleted, payload),
        })
    }

    /// Returns the depth of this revision (root = 1).
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns the opaque hash part.
    #[inline]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Returns true for a generation-1 revision.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.generation == 1
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.generation, self.hash)
    }
}

impl FromStr for RevisionId {
    type Err = RevisionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (generation, hash) = s
            .split_once('-')
            .ok_or_else(|| RevisionIdError::Malformed(s.to_string()))?;
        let generation: u32 = generation
            .parse()
            .map_err(|_| RevisionIdError::Malformed(s.to_string()))?;
        Self::new(generation, hash)
    }
}

impl TryFrom<String> for RevisionId {
    type Error = RevisionIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RevisionId> for String {
    fn from(value: RevisionId) -> Self {
        value.to_string()
    }
}
