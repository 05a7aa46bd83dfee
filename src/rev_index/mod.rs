//! Revision Index
//!
//! Durable map from `(document, revision)` to an index entry carrying the
//! revision's durability status and its immutable lineage metadata.
//!
//! The index is the single source of truth for whether a revision's content
//! exists. It is written BEFORE the physical field write (status `pending`)
//! and flipped to `available` only after that write succeeds. A failed write
//! therefore leaves a `pending` trail that a later retry can detect and
//! complete.
//!
//! # API
//!
//! - `put(entry)` - Insert an entry or change its status (idempotent)
//! - `get(document, revision)` - Exact lookup, `NotFound` when absent
//! - `list_for_document(document)` - All entries ordered by revision
//!
//! # Invariants
//!
//! - Exactly one entry per `(document, revision)`
//! - Entries are never deleted
//! - `available` never reverts
//! - A child is indexed only after its parent, within the same workspace

mod entry;
mod errors;
mod file;
mod memory;
mod record;
mod state;

pub use entry::{IndexEntry, RevisionStatus};
pub use errors::{IndexError, IndexResult};
pub use file::{FileRevisionIndex, INDEX_FILE_NAME};
pub use memory::MemoryRevisionIndex;

use crate::revision::{DocumentId, RevisionId};

/// Storage seam for revision index implementations.
pub trait RevisionIndex {
    /// Inserts `entry`, or changes the status of the existing entry.
    ///
    /// Re-putting an entry with its current status is a no-op.
    fn put(&mut self, entry: IndexEntry) -> IndexResult<()>;

    /// Returns the entry for `(document, revision)`.
    fn get(&self, document: &DocumentId, revision: &RevisionId) -> IndexResult<IndexEntry>;

    /// Returns every entry of `document`, ordered by revision id.
    ///
    /// Unknown documents yield an empty list.
    fn list_for_document(&self, document: &DocumentId) -> IndexResult<Vec<IndexEntry>>;

    /// Returns every document that has at least one entry.
    fn documents(&self) -> IndexResult<Vec<DocumentId>>;

    /// Returns the status of `(document, revision)`.
    fn status(&self, document: &DocumentId, revision: &RevisionId) -> IndexResult<RevisionStatus> {
        Ok(self.get(document, revision)?.status)
    }

    /// Changes the status of an existing entry.
    fn set_status(
        &mut self,
        document: &DocumentId,
        revision: &RevisionId,
        status: RevisionStatus,
    ) -> IndexResult<()> {
        let entry = self.get(document, revision)?;
        self.put(entry.with_status(status))
    }
}
