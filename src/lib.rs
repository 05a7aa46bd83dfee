//! multirev - multi-version, workspace-isolated record storage
//!
//! Every save of a record appends an immutable revision to a per-document
//! revision tree. A durable revision index tracks whether each revision's
//! content is `pending`, `available` or `orphaned`, so a failed write never
//! changes what readers see and a retry completes the revision it started.
//!
//! # Layout
//!
//! - `revision` - revision ids, document and workspace ids
//! - `journal` - checksummed append-only frame files
//! - `rev_index` - the revision index (memory and journal backed)
//! - `rev_tree` - branch enumeration and winner selection
//! - `workspace` - entity to workspace associations
//! - `entity` - `VersionedEntityStorage` and its collaborators
//! - `config`, `observability`, `crash_point`, `cli`

pub mod cli;
pub mod config;
pub mod crash_point;
pub mod entity;
pub mod journal;
pub mod observability;
pub mod rev_index;
pub mod rev_tree;
pub mod revision;
pub mod workspace;

pub use config::{ConfigError, StorageConfig};
pub use entity::{
    Entity, EntityStorageError, FieldStore, MemoryFieldStore, StaticTypeRegistry, TypeRegistry,
    TypeTracker, VersionedEntityStorage,
};
pub use rev_index::{IndexEntry, RevisionStatus};
pub use rev_tree::RevisionTree;
pub use revision::{DocumentId, RevisionId, WorkspaceId};
