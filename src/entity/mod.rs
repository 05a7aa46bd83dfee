//! Versioned entity storage
//!
//! Orchestrates the revision index, the revision tree, workspace
//! associations and an external field store into create / update / delete /
//! load operations over multi-version, workspace-isolated records.

mod errors;
mod field_store;
mod handle;
mod registry;
mod storage;

pub use errors::{EntityResult, EntityStorageError};
pub use field_store::{FieldStore, FieldStoreError, FieldStoreResult, MemoryFieldStore};
pub use handle::Entity;
pub use registry::{StaticTypeRegistry, TypeRegistry, TypeTracker};
pub use storage::{FileEntityStorage, MemoryEntityStorage, VersionedEntityStorage};
