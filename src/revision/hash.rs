//! Content-derived revision hashes
//!
//! A revision hash covers everything that distinguishes one revision from a
//! sibling: its parent, the workspace it was written in, the deleted flag and
//! the payload. Payloads are hashed in their canonical JSON form (object keys
//! sorted), so equal content always yields the same hash.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{RevisionId, WorkspaceId};

/// Number of hex characters kept from the SHA-256 digest.
pub const HASH_HEX_LEN: usize = 32;

/// Computes the hash for a revision with the given lineage and content.
pub fn content_hash(
    parent: Option<&RevisionId>,
    workspace: &WorkspaceId,
    deleted: bool,
    payload: &Value,
) -> String {
    let mut hasher = Sha256::new();

    match parent {
        Some(rev) => hasher.update(rev.to_string().as_bytes()),
        None => hasher.update(b"root"),
    }
    hasher.update([0u8]);
    hasher.update(workspace.as_str().as_bytes());
    hasher.update([0u8, deleted as u8, 0u8]);
    // serde_json::Value serializes maps in key order, which makes this canonical
    hasher.update(payload.to_string().as_bytes());

    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(HASH_HEX_LEN);
    hex
}
