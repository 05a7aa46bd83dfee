//! Durability of the revision index and association journals
//!
//! - A pending entry survives a restart and a retry completes it
//! - Journal corruption is detected on open, never skipped
//! - Associations survive restarts and deletion

mod common;

use common::{generations, ws, FlakyFieldStore};
use multirev::entity::{FileEntityStorage, StaticTypeRegistry};
use multirev::rev_index::{
    FileRevisionIndex, IndexEntry, RevisionIndex, RevisionStatus, INDEX_FILE_NAME,
};
use multirev::workspace::{FileAssociationStore, WorkspaceAssociationStore, ASSOCIATION_FILE_NAME};
use multirev::{DocumentId, RevisionId, StorageConfig};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn config(data_dir: &Path) -> StorageConfig {
    StorageConfig::with_data_dir(data_dir, ["node"])
}

fn open(data_dir: &Path, fields: FlakyFieldStore) -> FileEntityStorage<FlakyFieldStore> {
    FileEntityStorage::open(
        &config(data_dir),
        &StaticTypeRegistry::new(["node"]),
        "node",
        fields,
    )
    .unwrap()
}

fn flip_byte(path: &Path, at: usize) {
    let mut contents = fs::read(path).unwrap();
    contents[at] ^= 0xFF;
    fs::write(path, contents).unwrap();
}

// =============================================================================
// Restart between pending write and flip
// =============================================================================

#[test]
fn test_pending_entry_survives_restart_and_retry_completes_it() {
    let dir = TempDir::new().unwrap();
    let live = ws("live");

    let mut storage = open(dir.path(), FlakyFieldStore::default());
    let mut entity = storage.create(json!({"title": "one"}), &live).unwrap();
    storage.update(&mut entity, json!({"title": "two"})).unwrap();

    storage.fields_mut().failing = true;
    storage
        .update(&mut entity, json!({"title": "three"}))
        .unwrap_err();
    let pending = entity.revision().cloned().unwrap();

    // restart: journals are replayed, field values are kept by their own store
    let mut fields = storage.into_field_store();
    fields.failing = false;
    let mut storage = open(dir.path(), fields);

    assert_eq!(
        storage.index().status(&entity.id(), &pending).unwrap(),
        RevisionStatus::Pending
    );
    assert_eq!(
        storage.load(entity.id(), &live).unwrap().payload(),
        &json!({"title": "two"})
    );

    let completed = storage.save(&mut entity).unwrap();
    assert_eq!(completed, pending);
    assert_eq!(
        generations(&storage.default_branch(entity.id(), &live).unwrap()),
        [1, 2, 3]
    );

    drop(storage);
    let index = FileRevisionIndex::open(dir.path().join("node").join(INDEX_FILE_NAME)).unwrap();
    assert_eq!(
        index.status(&entity.id(), &pending).unwrap(),
        RevisionStatus::Available
    );
    assert_eq!(index.len(), 3);
}

#[test]
fn test_orphaned_status_is_durable() {
    let dir = TempDir::new().unwrap();
    let live = ws("live");

    let mut storage = open(dir.path(), FlakyFieldStore::default());
    let mut entity = storage.create(json!({"v": 1}), &live).unwrap();
    storage.fields_mut().failing = true;
    storage.update(&mut entity, json!({"v": 2})).unwrap_err();
    let stale = entity.revision().cloned().unwrap();
    storage.fields_mut().failing = false;
    storage.update(&mut entity, json!({"v": 3})).unwrap();

    let storage = open(dir.path(), storage.into_field_store());
    assert_eq!(
        storage.index().status(&entity.id(), &stale).unwrap(),
        RevisionStatus::Orphaned
    );
    let tree = storage.revision_tree(entity.id(), &live).unwrap();
    assert_eq!(tree.orphaned(), [stale]);
    assert_eq!(tree.leaves().len(), 1);
}

// =============================================================================
// Corruption
// =============================================================================

#[test]
fn test_corrupt_index_journal_fails_open() {
    let dir = TempDir::new().unwrap();
    {
        let mut storage = open(dir.path(), FlakyFieldStore::default());
        storage.create(json!({"title": "x"}), &ws("live")).unwrap();
    }

    let path = dir.path().join("node").join(INDEX_FILE_NAME);
    let len = fs::metadata(&path).unwrap().len() as usize;
    flip_byte(&path, len - 1);

    let err = FileEntityStorage::open(
        &config(dir.path()),
        &StaticTypeRegistry::new(["node"]),
        "node",
        FlakyFieldStore::default(),
    )
    .err()
    .unwrap();
    assert_eq!(err.code(), "MULTIREV_JOURNAL_CORRUPTION");
}

#[test]
fn test_truncated_journal_tail_is_corruption() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(INDEX_FILE_NAME);
    let doc = DocumentId::generate();
    let root: RevisionId = "1-aa".parse().unwrap();
    {
        let mut index = FileRevisionIndex::open(&path).unwrap();
        index
            .put(IndexEntry::pending(doc, root.clone(), None, ws("live"), false))
            .unwrap();
        index
            .set_status(&doc, &root, RevisionStatus::Available)
            .unwrap();
    }

    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..contents.len() - 3]).unwrap();

    let err = FileRevisionIndex::open(&path).err().unwrap();
    assert_eq!(err.code(), "MULTIREV_JOURNAL_CORRUPTION");
}

#[test]
fn test_corrupt_association_journal_fails_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(ASSOCIATION_FILE_NAME);
    {
        let mut store = FileAssociationStore::open(&path).unwrap();
        store.track(&DocumentId::generate(), &ws("live")).unwrap();
    }
    flip_byte(&path, 6);

    assert!(FileAssociationStore::open(&path).is_err());
}

// =============================================================================
// Associations
// =============================================================================

#[test]
fn test_associations_survive_restart_after_delete() {
    let dir = TempDir::new().unwrap();
    let stage = ws("stage");

    let mut storage = open(dir.path(), FlakyFieldStore::default());
    let mut entity = storage.create(json!({}), &stage).unwrap();
    storage.delete(&mut entity).unwrap();

    let storage = open(dir.path(), storage.into_field_store());
    assert!(storage
        .tracking_workspace_ids(entity.id())
        .unwrap()
        .contains(&stage));
    assert!(storage.tracked_entities(&stage).unwrap().contains(&entity.id()));
    assert!(storage.load_deleted(entity.id(), &stage).is_ok());
}

#[test]
fn test_journals_live_under_type_directory() {
    let dir = TempDir::new().unwrap();
    let mut storage = open(dir.path(), FlakyFieldStore::default());
    storage.create(json!({}), &ws("live")).unwrap();

    assert!(dir.path().join("node").join(INDEX_FILE_NAME).exists());
    assert!(dir.path().join("node").join(ASSOCIATION_FILE_NAME).exists());
}
