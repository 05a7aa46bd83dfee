//! Versioned entity storage behavior
//!
//! Covers the save protocol end to end:
//! - default branch shape after creates and updates
//! - retry after a failed field write completes the pending revision
//! - tombstones and load_deleted
//! - workspace isolation and association tracking
//! - concurrent sibling updates and winner selection

mod common;

use common::{generations, ws, FlakyFieldStore};
use multirev::entity::{
    Entity, EntityStorageError, MemoryEntityStorage, StaticTypeRegistry, VersionedEntityStorage,
};
use multirev::rev_index::{RevisionIndex, RevisionStatus};
use multirev::{DocumentId, StorageConfig};
use serde_json::json;
use std::collections::BTreeSet;

// =============================================================================
// Test Utilities
// =============================================================================

fn storage() -> MemoryEntityStorage<FlakyFieldStore> {
    VersionedEntityStorage::in_memory(
        &StorageConfig::in_memory(["node"]),
        &StaticTypeRegistry::new(["node"]),
        "node",
        FlakyFieldStore::default(),
    )
    .unwrap()
}

// =============================================================================
// Default branch shape
// =============================================================================

#[test]
fn test_default_branch_grows_one_generation_per_save() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"title": "v1"}), &live).unwrap();
    assert_eq!(generations(&storage.default_branch(entity.id(), &live).unwrap()), [1]);

    storage.update(&mut entity, json!({"title": "v2"})).unwrap();
    storage.update(&mut entity, json!({"title": "v3"})).unwrap();

    let branch = storage.default_branch(entity.id(), &live).unwrap();
    assert_eq!(generations(&branch), [1, 2, 3]);
    assert_eq!(branch.last(), entity.revision());
    assert_eq!(
        storage.load(entity.id(), &live).unwrap().payload(),
        &json!({"title": "v3"})
    );
}

#[test]
fn test_identical_update_still_creates_child() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"n": 1}), &live).unwrap();
    let first = entity.revision().cloned().unwrap();
    let second = storage.update(&mut entity, json!({"n": 1})).unwrap();

    assert_ne!(first, second);
    assert_eq!(second.generation(), 2);
}

// =============================================================================
// Failure and retry
// =============================================================================

/// create D -> [gen1]; update -> [gen1, gen2]; failed update to gen3 leaves it
/// pending; retry with identical content flips it to available.
#[test]
fn test_retry_after_persistence_failure_reuses_revision() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"title": "one"}), &live).unwrap();
    storage.update(&mut entity, json!({"title": "two"})).unwrap();
    let gen2 = entity.revision().cloned().unwrap();

    storage.fields_mut().failing = true;
    let err = storage
        .update(&mut entity, json!({"title": "three"}))
        .unwrap_err();
    assert_eq!(err.code(), "MULTIREV_ENTITY_PERSISTENCE_FAILURE");
    assert!(err.to_string().contains("disk full"));

    let gen3 = entity.revision().cloned().unwrap();
    assert_eq!(gen3.generation(), 3);
    assert_eq!(
        storage.index().status(&entity.id(), &gen3).unwrap(),
        RevisionStatus::Pending
    );

    // previous committed revision is still what readers see
    let visible = storage.load(entity.id(), &live).unwrap();
    assert_eq!(visible.revision(), Some(&gen2));
    assert_eq!(visible.payload(), &json!({"title": "two"}));

    storage.fields_mut().failing = false;
    let retried = storage.save(&mut entity).unwrap();
    assert_eq!(retried, gen3);
    assert_eq!(
        storage.index().status(&entity.id(), &gen3).unwrap(),
        RevisionStatus::Available
    );

    let branch = storage.default_branch(entity.id(), &live).unwrap();
    assert_eq!(generations(&branch), [1, 2, 3]);
    assert_eq!(branch[2], gen3);

    let at_gen3 = storage
        .list_for_document(entity.id())
        .unwrap()
        .into_iter()
        .filter(|e| e.revision.generation() == 3)
        .count();
    assert_eq!(at_gen3, 1);
    assert_eq!(storage.metrics().snapshot().revisions_reused, 1);
}

#[test]
fn test_retry_with_changed_content_orphans_stale_revision() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"title": "one"}), &live).unwrap();
    storage.fields_mut().failing = true;
    storage
        .update(&mut entity, json!({"title": "draft"}))
        .unwrap_err();
    let stale = entity.revision().cloned().unwrap();

    storage.fields_mut().failing = false;
    let fresh = storage.update(&mut entity, json!({"title": "final"})).unwrap();

    assert_ne!(fresh, stale);
    assert_eq!(fresh.generation(), 2);
    assert_eq!(
        storage.index().status(&entity.id(), &stale).unwrap(),
        RevisionStatus::Orphaned
    );

    let tree = storage.revision_tree(entity.id(), &live).unwrap();
    assert_eq!(tree.orphaned(), [stale]);
    assert!(!tree.has_conflicts());
    assert_eq!(tree.winner(), Some(&fresh));
}

#[test]
fn test_failed_create_can_be_retried_through_save() {
    let mut storage = storage();
    let live = ws("live");
    let mut entity = Entity::new("node", live.clone(), json!({"title": "new"}));

    storage.fields_mut().failing = true;
    assert!(storage.save(&mut entity).is_err());
    assert!(storage.load(entity.id(), &live).unwrap_err().is_not_found());

    storage.fields_mut().failing = false;
    let root = storage.save(&mut entity).unwrap();
    assert!(root.is_root());
    assert_eq!(storage.list_for_document(entity.id()).unwrap().len(), 1);
    assert!(storage.load(entity.id(), &live).is_ok());
}

// =============================================================================
// Tombstones
// =============================================================================

#[test]
fn test_delete_appends_tombstone_tip() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"title": "doomed"}), &live).unwrap();
    let tombstone = storage.delete(&mut entity).unwrap();

    assert_eq!(tombstone.generation(), 2);
    assert!(storage.load(entity.id(), &live).unwrap_err().is_not_found());

    let deleted = storage.load_deleted(entity.id(), &live).unwrap();
    assert!(deleted.is_deleted());
    assert_eq!(deleted.revision(), Some(&tombstone));

    let tree = storage.revision_tree(entity.id(), &live).unwrap();
    assert!(tree.node(&tombstone).unwrap().deleted);
}

#[test]
fn test_load_deleted_refuses_live_entity() {
    let mut storage = storage();
    let live = ws("live");
    let entity = storage.create(json!({}), &live).unwrap();

    assert!(storage
        .load_deleted(entity.id(), &live)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_multiple_loads_skip_missing() {
    let mut storage = storage();
    let live = ws("live");

    let a = storage.create(json!({"n": "a"}), &live).unwrap();
    let b = storage.create(json!({"n": "b"}), &live).unwrap();
    let c = storage.create(json!({"n": "c"}), &live).unwrap();
    let unknown = DocumentId::generate();

    let mut batch = vec![b.clone(), c.clone()];
    let tombstones = storage.delete_multiple(&mut batch).unwrap();
    assert_eq!(tombstones.len(), 2);
    assert!(batch.iter().all(Entity::is_deleted));

    let ids = [a.id(), b.id(), c.id(), unknown];
    let live_ones = storage.load_multiple(&ids, &live).unwrap();
    assert_eq!(live_ones.len(), 1);
    assert_eq!(live_ones[0].id(), a.id());

    let deleted = storage.load_multiple_deleted(&ids, &live).unwrap();
    let deleted_ids: Vec<_> = deleted.iter().map(Entity::id).collect();
    assert_eq!(deleted_ids, [b.id(), c.id()]);
}

#[test]
fn test_historical_revision_of_deleted_entity_is_loadable() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"title": "kept"}), &live).unwrap();
    let first = entity.revision().cloned().unwrap();
    storage.delete(&mut entity).unwrap();

    let old = storage.load_revision(entity.id(), &first, &live).unwrap();
    assert_eq!(old.payload(), &json!({"title": "kept"}));
    assert!(!old.is_deleted());
    assert!(!old.is_default_revision());
}

#[test]
fn test_load_revision_reports_default_revision() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"title": "first"}), &live).unwrap();
    let first = entity.revision().cloned().unwrap();
    assert!(entity.is_default_revision());

    let second = storage.update(&mut entity, json!({"title": "second"})).unwrap();
    assert!(entity.is_default_revision());

    let old = storage.load_revision(entity.id(), &first, &live).unwrap();
    assert_eq!(old.payload(), &json!({"title": "first"}));
    assert!(!old.is_default_revision());

    let current = storage.load_revision(entity.id(), &second, &live).unwrap();
    assert!(current.is_default_revision());
    assert!(storage.load(entity.id(), &live).unwrap().is_default_revision());
}

// =============================================================================
// Workspace isolation
// =============================================================================

#[test]
fn test_entity_saved_in_one_workspace_invisible_in_another() {
    let mut storage = storage();
    let (a, b) = (ws("alpha"), ws("beta"));

    let entity = storage.create(json!({"title": "only in alpha"}), &a).unwrap();

    assert!(storage.load(entity.id(), &b).unwrap_err().is_not_found());
    assert!(storage.default_branch(entity.id(), &b).unwrap().is_empty());
}

#[test]
fn test_same_entity_in_two_workspaces_has_independent_roots() {
    let mut storage = storage();
    let (a, b) = (ws("alpha"), ws("beta"));
    let payload = json!({"title": "same"});

    let in_a = storage.create(payload.clone(), &a).unwrap();
    let mut in_b = Entity::with_id("node", in_a.id(), b.clone(), payload);
    storage.save(&mut in_b).unwrap();

    let root_a = in_a.revision().unwrap();
    let root_b = in_b.revision().unwrap();
    assert!(root_a.is_root() && root_b.is_root());
    assert_ne!(root_a, root_b);

    assert_eq!(storage.default_branch(in_a.id(), &a).unwrap(), [root_a.clone()]);
    assert_eq!(storage.default_branch(in_a.id(), &b).unwrap(), [root_b.clone()]);
    assert_eq!(storage.load(in_a.id(), &a).unwrap().revision(), Some(root_a));
    assert_eq!(storage.load(in_a.id(), &b).unwrap().revision(), Some(root_b));
    assert_eq!(storage.list_for_document(in_a.id()).unwrap().len(), 2);
}

#[test]
fn test_load_revision_across_workspaces_is_violation() {
    let mut storage = storage();
    let (a, b) = (ws("alpha"), ws("beta"));

    let entity = storage.create(json!({}), &a).unwrap();
    let rev = entity.revision().unwrap();

    let err = storage.load_revision(entity.id(), rev, &b).unwrap_err();
    assert!(matches!(
        err,
        EntityStorageError::WorkspaceIsolationViolation { .. }
    ));
    assert_eq!(err.code(), "MULTIREV_ENTITY_WORKSPACE_ISOLATION");
    assert_eq!(storage.metrics().snapshot().isolation_violations, 1);
}

#[test]
fn test_load_revision_refuses_pending() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"v": 1}), &live).unwrap();
    storage.fields_mut().failing = true;
    storage.update(&mut entity, json!({"v": 2})).unwrap_err();
    let pending = entity.revision().cloned().unwrap();

    let err = storage
        .load_revision(entity.id(), &pending, &live)
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("pending"));
}

// =============================================================================
// Workspace associations
// =============================================================================

#[test]
fn test_association_survives_delete() {
    let mut storage = storage();
    let w = ws("stage");

    let mut entity = storage.create(json!({}), &w).unwrap();
    assert_eq!(
        storage.tracking_workspace_ids(entity.id()).unwrap(),
        BTreeSet::from([w.clone()])
    );

    storage.delete(&mut entity).unwrap();
    assert_eq!(
        storage.tracking_workspace_ids(entity.id()).unwrap(),
        BTreeSet::from([w.clone()])
    );
    assert!(storage.tracked_entities(&w).unwrap().contains(&entity.id()));
}

#[test]
fn test_failed_create_is_not_tracked() {
    let mut storage = storage();
    let w = ws("stage");
    let mut entity = Entity::new("node", w.clone(), json!({}));

    storage.fields_mut().failing = true;
    storage.save(&mut entity).unwrap_err();
    assert!(storage.tracking_workspace_ids(entity.id()).unwrap().is_empty());
}

// =============================================================================
// Concurrent updates
// =============================================================================

#[test]
fn test_concurrent_updates_produce_siblings_and_one_winner() {
    let mut storage = storage();
    let live = ws("live");

    let mut entity = storage.create(json!({"title": "base"}), &live).unwrap();
    storage.update(&mut entity, json!({"title": "gen2"})).unwrap();
    let gen2 = entity.revision().cloned().unwrap();

    let mut writer_a = storage.load(entity.id(), &live).unwrap();
    let mut writer_b = storage.load(entity.id(), &live).unwrap();
    let gen3a = storage.update(&mut writer_a, json!({"title": "a"})).unwrap();
    let gen3b = storage.update(&mut writer_b, json!({"title": "b"})).unwrap();

    assert_eq!(gen3a.generation(), 3);
    assert_eq!(gen3b.generation(), 3);
    assert_ne!(gen3a, gen3b);

    let entries = storage.list_for_document(entity.id()).unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries
        .iter()
        .all(|e| e.status == RevisionStatus::Available));

    let expected = gen3a.clone().max(gen3b.clone());
    let loser = gen3a.clone().min(gen3b.clone());
    assert_eq!(storage.winner(entity.id(), &live).unwrap(), Some(expected.clone()));

    let branch = storage.default_branch(entity.id(), &live).unwrap();
    assert_eq!(branch.last(), Some(&expected));
    assert_eq!(branch[1], gen2);

    let tree = storage.revision_tree(entity.id(), &live).unwrap();
    assert!(tree.has_conflicts());
    assert_eq!(tree.conflicts(), [&loser]);

    let current = storage.load(entity.id(), &live).unwrap();
    assert_eq!(current.revision(), Some(&expected));

    // writer_a saved first, when it was the only generation-3 revision
    assert!(writer_a.is_default_revision());
    assert_eq!(writer_b.is_default_revision(), gen3b == expected);
}

/// A failed write on one handle and a committed write on another, both from
/// gen2. Whichever hash wins the full tree, reads resolve to the committed one.
#[test]
fn test_failed_sibling_never_hides_committed_update() {
    let mut pending_won = 0;

    for i in 0..20 {
        let mut storage = storage();
        let live = ws("live");

        let mut writer_a = storage.create(json!({"title": "base"}), &live).unwrap();
        storage.update(&mut writer_a, json!({"title": "gen2"})).unwrap();
        let mut writer_b = storage.load(writer_a.id(), &live).unwrap();

        storage.fields_mut().failing = true;
        storage
            .update(&mut writer_a, json!({"a": i}))
            .unwrap_err();
        let pending = writer_a.revision().cloned().unwrap();
        assert!(!writer_a.is_default_revision());

        storage.fields_mut().failing = false;
        let committed = storage.update(&mut writer_b, json!({"b": i})).unwrap();
        assert_eq!(committed.generation(), 3);
        assert!(writer_b.is_default_revision());

        let winner = storage.winner(writer_a.id(), &live).unwrap().unwrap();
        if winner == pending {
            pending_won += 1;
        }

        let visible = storage.load(writer_a.id(), &live).unwrap();
        assert_eq!(visible.revision(), Some(&committed), "iteration {}", i);
        assert_eq!(visible.payload(), &json!({"b": i}));

        let tree = storage.revision_tree(writer_a.id(), &live).unwrap();
        assert_eq!(tree.committed_branch().last(), Some(&committed));
    }

    // sanity check that the loop exercised the pending-wins case
    assert!(pending_won > 0);
}

#[test]
fn test_winner_is_stable_across_rebuilds() {
    let mut storage = storage();
    let live = ws("live");

    let entity = storage.create(json!({"title": "base"}), &live).unwrap();
    for i in 0..5 {
        let mut writer = entity.clone();
        storage.update(&mut writer, json!({"i": i})).unwrap();
    }

    let first = storage.winner(entity.id(), &live).unwrap();
    for _ in 0..3 {
        assert_eq!(storage.winner(entity.id(), &live).unwrap(), first);
    }
    assert_eq!(
        storage.revision_tree(entity.id(), &live).unwrap().leaves().len(),
        5
    );
}
