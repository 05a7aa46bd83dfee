//! Revision identity types
//!
//! This module provides:
//! - `RevisionId` - `(generation, hash)` identity of one immutable revision
//! - `DocumentId` - Stable UUID of a document across revisions and workspaces
//! - `WorkspaceId` - Isolation scope identifier
//! - `content_hash` - Deterministic content-derived revision hash

mod hash;
mod ids;
mod revision_id;

pub use hash::{content_hash, HASH_HEX_LEN};
pub use ids::{DocumentId, WorkspaceId};
pub use revision_id::{RevisionId, RevisionIdError};
