//! VersionedEntityStorage - save protocol, reads and diagnostics
//!
//! Save protocol for one revision:
//!
//! 1. Resolve the parent from the handle's carried revision
//! 2. Derive the revision id from parent, workspace, deleted flag and payload
//! 3. Index the revision as `pending` (durable before anything else)
//! 4. Write the payload through the field store
//! 5. Flip the index entry to `available`
//! 6. Track the workspace association
//!
//! A failure at step 4 returns `PersistenceFailure` and leaves the `pending`
//! entry behind. Reads only ever resolve to `available` revisions, so the
//! previously committed revision stays visible.
//!
//! # Retries
//!
//! When the handle's carried revision is still `pending` (or was orphaned),
//! the next save reuses that revision's parent. Identical content derives the
//! identical id, so the existing entry is completed instead of a sibling
//! being created. Changed content abandons the stale entry (`orphaned`) and
//! indexes a fresh revision in its place.

use std::collections::BTreeSet;

use serde_json::Value;

use super::errors::{EntityResult, EntityStorageError};
use super::field_store::{FieldStore, FieldStoreError};
use super::handle::Entity;
use super::registry::TypeRegistry;
use crate::config::StorageConfig;
use crate::crash_point::{maybe_crash, points};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::rev_index::{
    FileRevisionIndex, IndexEntry, MemoryRevisionIndex, RevisionIndex, RevisionStatus,
};
use crate::rev_tree::RevisionTree;
use crate::revision::{DocumentId, RevisionId, WorkspaceId};
use crate::workspace::{FileAssociationStore, MemoryAssociationStore, WorkspaceAssociationStore};

/// Multi-version storage for one record type.
#[derive(Debug)]
pub struct VersionedEntityStorage<I, A, F> {
    entity_type: String,
    default_workspace: WorkspaceId,
    index: I,
    associations: A,
    fields: F,
    metrics: MetricsRegistry,
}

/// Storage backed by the journals under `<data_dir>/<entity_type>/`.
pub type FileEntityStorage<F> = VersionedEntityStorage<FileRevisionIndex, FileAssociationStore, F>;

/// Storage that keeps index and associations in memory.
pub type MemoryEntityStorage<F> =
    VersionedEntityStorage<MemoryRevisionIndex, MemoryAssociationStore, F>;

fn check_type(
    config: &StorageConfig,
    registry: &dyn TypeRegistry,
    entity_type: &str,
) -> EntityResult<WorkspaceId> {
    config.validate()?;
    if !config.is_supported(entity_type) {
        return Err(EntityStorageError::Validation(format!(
            "entity type '{}' is not enabled for revisions",
            entity_type
        )));
    }
    if !registry.is_revisionable(entity_type) {
        return Err(EntityStorageError::Validation(format!(
            "entity type '{}' is not revisionable",
            entity_type
        )));
    }
    Ok(config.default_workspace_id()?)
}

impl<F: FieldStore> FileEntityStorage<F> {
    /// Opens (or creates) the journals of `entity_type` and replays them.
    pub fn open(
        config: &StorageConfig,
        registry: &dyn TypeRegistry,
        entity_type: &str,
        fields: F,
    ) -> EntityResult<Self> {
        check_type(config, registry, entity_type)?;
        let dir = config.type_dir(entity_type).ok_or_else(|| {
            EntityStorageError::Validation("data_dir is not configured".to_string())
        })?;
        let index = FileRevisionIndex::open_in_dir(&dir)?;
        let associations = FileAssociationStore::open_in_dir(&dir)?;
        Self::new(config, registry, entity_type, index, associations, fields)
    }
}

impl<F: FieldStore> MemoryEntityStorage<F> {
    pub fn in_memory(
        config: &StorageConfig,
        registry: &dyn TypeRegistry,
        entity_type: &str,
        fields: F,
    ) -> EntityResult<Self> {
        Self::new(
            config,
            registry,
            entity_type,
            MemoryRevisionIndex::new(),
            MemoryAssociationStore::new(),
            fields,
        )
    }
}

impl<I, A, F> VersionedEntityStorage<I, A, F>
where
    I: RevisionIndex,
    A: WorkspaceAssociationStore,
    F: FieldStore,
{
    /// Builds a storage from explicit collaborators.
    ///
    /// Fails with `Validation` unless `entity_type` is enabled in `config`
    /// and reported revisionable by `registry`.
    pub fn new(
        config: &StorageConfig,
        registry: &dyn TypeRegistry,
        entity_type: &str,
        index: I,
        associations: A,
        fields: F,
    ) -> EntityResult<Self> {
        let default_workspace = check_type(config, registry, entity_type)?;
        Ok(Self {
            entity_type: entity_type.to_string(),
            default_workspace,
            index,
            associations,
            fields,
            metrics: MetricsRegistry::new(),
        })
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn default_workspace(&self) -> &WorkspaceId {
        &self.default_workspace
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn associations(&self) -> &A {
        &self.associations
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut F {
        &mut self.fields
    }

    /// Gives the field store back, dropping index and associations.
    pub fn into_field_store(self) -> F {
        self.fields
    }

    // ===== writes =====

    /// Creates a new entity in `workspace` with a fresh id.
    ///
    /// A failed create loses the handle; callers that need to retry one
    /// should build it with `Entity::new` and call `save`.
    pub fn create(&mut self, payload: Value, workspace: &WorkspaceId) -> EntityResult<Entity> {
        let mut entity = Entity::new(self.entity_type.clone(), workspace.clone(), payload);
        self.save(&mut entity)?;
        Ok(entity)
    }

    /// Replaces the payload and saves a child of the handle's revision.
    pub fn update(&mut self, entity: &mut Entity, payload: Value) -> EntityResult<RevisionId> {
        if entity.is_new() {
            return Err(EntityStorageError::Validation(format!(
                "entity {} has never been saved",
                entity.id()
            )));
        }
        entity.set_payload(payload);
        self.save(entity)
    }

    /// Appends a tombstone. Deleting an already committed tombstone is a no-op.
    pub fn delete(&mut self, entity: &mut Entity) -> EntityResult<RevisionId> {
        let Some(carried) = entity.revision().cloned() else {
            return Err(EntityStorageError::Validation(format!(
                "entity {} has never been saved",
                entity.id()
            )));
        };
        if entity.is_deleted() {
            let entry = self.entry_in_workspace(entity.id(), &carried, entity.workspace())?;
            if entry.deleted && entry.status == RevisionStatus::Available {
                return Ok(carried);
            }
        }
        entity.mark_deleted();
        self.save(entity)
    }

    /// Deletes each entity in order, stopping at the first failure.
    pub fn delete_multiple(&mut self, entities: &mut [Entity]) -> EntityResult<Vec<RevisionId>> {
        entities.iter_mut().map(|e| self.delete(e)).collect()
    }

    /// Saves the handle's current state as a new revision, or completes the
    /// pending revision of an earlier failed attempt.
    ///
    /// On success the handle carries the committed revision. On
    /// `PersistenceFailure` it carries the pending one, ready for a retry.
    pub fn save(&mut self, entity: &mut Entity) -> EntityResult<RevisionId> {
        if entity.entity_type() != self.entity_type {
            return Err(EntityStorageError::Validation(format!(
                "entity type '{}' does not belong to '{}' storage",
                entity.entity_type(),
                self.entity_type
            )));
        }

        let id = entity.id();
        let workspace = entity.workspace().clone();

        let (parent, stale) = match entity.revision() {
            None => (None, None),
            Some(carried) => {
                let entry = self.entry_in_workspace(id, carried, &workspace)?;
                match entry.status {
                    RevisionStatus::Available => (Some(entry.revision), None),
                    RevisionStatus::Pending | RevisionStatus::Orphaned => {
                        (entry.parent.clone(), Some(entry))
                    }
                }
            }
        };

        let revision =
            RevisionId::derive(parent.as_ref(), &workspace, entity.is_deleted(), entity.payload())?;

        let mut reused = false;
        if let Some(stale) = stale {
            if stale.revision == revision {
                reused = true;
            } else if stale.status == RevisionStatus::Pending {
                self.index
                    .set_status(&id, &stale.revision, RevisionStatus::Orphaned)?;
                self.metrics.increment_revisions_orphaned();
                self.log(Event::RevisionOrphaned, id, &stale.revision, &workspace);
            }
        }

        if !reused {
            match self.index.get(&id, &revision) {
                Ok(existing) if existing.status == RevisionStatus::Available => {
                    // same parent, same content: already committed
                    entity.set_revision(revision.clone());
                    self.track(id, &workspace)?;
                    self.refresh_default_flag(entity)?;
                    return Ok(revision);
                }
                Ok(_) => reused = true,
                Err(e) if e.is_not_found() => {
                    self.index.put(IndexEntry::pending(
                        id,
                        revision.clone(),
                        parent,
                        workspace.clone(),
                        entity.is_deleted(),
                    ))?;
                    self.metrics.increment_revisions_indexed();
                    self.log(Event::RevisionIndexed, id, &revision, &workspace);
                }
                Err(e) => return Err(e.into()),
            }
        }

        entity.set_revision(revision.clone());
        maybe_crash(points::ENTITY_AFTER_INDEX_PENDING);

        if let Err(e) = self
            .fields
            .write_fields(&id, &revision, &workspace, entity.payload())
        {
            let message = e.to_string();
            self.metrics.increment_persistence_failures();
            log_event_with_fields(
                Event::PersistenceFailed,
                &[
                    ("document", &id.to_string()),
                    ("entity_type", &self.entity_type),
                    ("message", &message),
                    ("revision", &revision.to_string()),
                    ("workspace", workspace.as_str()),
                ],
            );
            return Err(EntityStorageError::PersistenceFailure {
                entity: id,
                revision,
                message,
            });
        }
        maybe_crash(points::ENTITY_AFTER_FIELD_WRITE);

        self.index
            .set_status(&id, &revision, RevisionStatus::Available)?;
        self.metrics.increment_revisions_committed();
        if reused {
            self.metrics.increment_revisions_reused();
            self.log(Event::RevisionReused, id, &revision, &workspace);
        } else {
            self.log(Event::RevisionCommitted, id, &revision, &workspace);
        }

        maybe_crash(points::ENTITY_BEFORE_TRACK);
        self.track(id, &workspace)?;
        self.refresh_default_flag(entity)?;
        Ok(revision)
    }

    // ===== reads =====

    /// Current state of `id` in `workspace`.
    ///
    /// NotFound when the document has no committed revision there or when
    /// its current revision is a tombstone.
    pub fn load(&self, id: DocumentId, workspace: &WorkspaceId) -> EntityResult<Entity> {
        let (revision, deleted) = self.committed_tip(id, workspace)?;
        if deleted {
            return Err(EntityStorageError::not_found(id, workspace, "entity is deleted"));
        }
        self.read_entity(id, revision, workspace, false, true)
    }

    /// Loads every id that exists; missing and deleted ones are skipped.
    pub fn load_multiple(
        &self,
        ids: &[DocumentId],
        workspace: &WorkspaceId,
    ) -> EntityResult<Vec<Entity>> {
        collect_found(ids.iter().map(|id| self.load(*id, workspace)))
    }

    /// The tombstone of a deleted entity. NotFound unless the current
    /// revision is a tombstone.
    pub fn load_deleted(&self, id: DocumentId, workspace: &WorkspaceId) -> EntityResult<Entity> {
        let (revision, deleted) = self.committed_tip(id, workspace)?;
        if !deleted {
            return Err(EntityStorageError::not_found(id, workspace, "entity is not deleted"));
        }
        self.read_entity(id, revision, workspace, true, true)
    }

    pub fn load_multiple_deleted(
        &self,
        ids: &[DocumentId],
        workspace: &WorkspaceId,
    ) -> EntityResult<Vec<Entity>> {
        collect_found(ids.iter().map(|id| self.load_deleted(*id, workspace)))
    }

    /// A specific historical revision, tombstones included.
    ///
    /// Refuses revisions indexed in another workspace and revisions that
    /// never became `available`. The returned handle reports whether the
    /// revision is the one `load` currently resolves to.
    pub fn load_revision(
        &self,
        id: DocumentId,
        revision: &RevisionId,
        workspace: &WorkspaceId,
    ) -> EntityResult<Entity> {
        let entry = self.entry_in_workspace(id, revision, workspace)?;
        if entry.status != RevisionStatus::Available {
            return Err(EntityStorageError::not_found(
                id,
                workspace,
                format!("revision {} is {}", revision, entry.status),
            ));
        }
        let is_default = self.committed_tip(id, workspace)?.0 == entry.revision;
        self.read_entity(id, entry.revision, workspace, entry.deleted, is_default)
    }

    // ===== diagnostics =====

    pub fn revision_tree(&self, id: DocumentId, workspace: &WorkspaceId) -> EntityResult<RevisionTree> {
        let entries = self.index.list_for_document(&id)?;
        Ok(RevisionTree::build_for_workspace(id, workspace, entries))
    }

    pub fn default_branch(
        &self,
        id: DocumentId,
        workspace: &WorkspaceId,
    ) -> EntityResult<Vec<RevisionId>> {
        Ok(self.revision_tree(id, workspace)?.default_branch())
    }

    pub fn default_branch_with_status(
        &self,
        id: DocumentId,
        workspace: &WorkspaceId,
    ) -> EntityResult<Vec<(RevisionId, RevisionStatus)>> {
        Ok(self.revision_tree(id, workspace)?.default_branch_with_status())
    }

    pub fn winner(&self, id: DocumentId, workspace: &WorkspaceId) -> EntityResult<Option<RevisionId>> {
        Ok(self.revision_tree(id, workspace)?.winner().cloned())
    }

    /// Every indexed revision of `id` across all workspaces.
    pub fn list_for_document(&self, id: DocumentId) -> EntityResult<Vec<IndexEntry>> {
        Ok(self.index.list_for_document(&id)?)
    }

    pub fn tracking_workspace_ids(&self, id: DocumentId) -> EntityResult<BTreeSet<WorkspaceId>> {
        Ok(self.associations.tracking_workspace_ids(&id)?)
    }

    pub fn tracked_entities(&self, workspace: &WorkspaceId) -> EntityResult<BTreeSet<DocumentId>> {
        Ok(self.associations.tracked_entities(workspace)?)
    }

    // ===== internals =====

    fn committed_tip(
        &self,
        id: DocumentId,
        workspace: &WorkspaceId,
    ) -> EntityResult<(RevisionId, bool)> {
        let tree = self.revision_tree(id, workspace)?;
        tree.committed_tip()
            .map(|node| (node.revision.clone(), node.deleted))
            .ok_or_else(|| {
                EntityStorageError::not_found(id, workspace, "no committed revision")
            })
    }

    /// A concurrent sibling with a higher id can keep a fresh commit off the
    /// default branch.
    fn refresh_default_flag(&self, entity: &mut Entity) -> EntityResult<()> {
        let (tip, _) = self.committed_tip(entity.id(), entity.workspace())?;
        let is_default = entity.revision() == Some(&tip);
        entity.set_default_revision(is_default);
        Ok(())
    }

    /// Looks up an index entry and enforces workspace isolation.
    fn entry_in_workspace(
        &self,
        id: DocumentId,
        revision: &RevisionId,
        workspace: &WorkspaceId,
    ) -> EntityResult<IndexEntry> {
        let entry = match self.index.get(&id, revision) {
            Ok(entry) => entry,
            Err(e) if e.is_not_found() => {
                return Err(EntityStorageError::not_found(
                    id,
                    workspace,
                    format!("revision {} is not indexed", revision),
                ))
            }
            Err(e) => return Err(e.into()),
        };
        if &entry.workspace != workspace {
            self.metrics.increment_isolation_violations();
            log_event_with_fields(
                Event::IsolationViolation,
                &[
                    ("document", &id.to_string()),
                    ("owner", entry.workspace.as_str()),
                    ("requested", workspace.as_str()),
                    ("revision", &revision.to_string()),
                ],
            );
            return Err(EntityStorageError::WorkspaceIsolationViolation {
                entity: id,
                revision: revision.clone(),
                owner: entry.workspace,
                requested: workspace.clone(),
            });
        }
        Ok(entry)
    }

    fn read_entity(
        &self,
        id: DocumentId,
        revision: RevisionId,
        workspace: &WorkspaceId,
        deleted: bool,
        is_default: bool,
    ) -> EntityResult<Entity> {
        let payload = self
            .fields
            .read_fields(&id, &revision, workspace)
            .map_err(|e| match e {
                FieldStoreError::NotFound { .. } => EntityStorageError::PersistenceFailure {
                    entity: id,
                    revision: revision.clone(),
                    message: format!("indexed as available but {}", e),
                },
                FieldStoreError::Rejected(message) => EntityStorageError::PersistenceFailure {
                    entity: id,
                    revision: revision.clone(),
                    message,
                },
            })?;
        self.metrics.add_loads(1);
        Ok(Entity::loaded(
            &self.entity_type,
            id,
            revision,
            workspace.clone(),
            deleted,
            payload,
            is_default,
        ))
    }

    fn track(&mut self, id: DocumentId, workspace: &WorkspaceId) -> EntityResult<()> {
        if self.associations.track(&id, workspace)? {
            log_event_with_fields(
                Event::WorkspaceTracked,
                &[
                    ("document", &id.to_string()),
                    ("entity_type", &self.entity_type),
                    ("workspace", workspace.as_str()),
                ],
            );
        }
        Ok(())
    }

    fn log(&self, event: Event, id: DocumentId, revision: &RevisionId, workspace: &WorkspaceId) {
        log_event_with_fields(
            event,
            &[
                ("document", &id.to_string()),
                ("entity_type", &self.entity_type),
                ("revision", &revision.to_string()),
                ("workspace", workspace.as_str()),
            ],
        );
    }
}

/// Keeps successful loads, drops NotFound, propagates anything else.
fn collect_found(results: impl Iterator<Item = EntityResult<Entity>>) -> EntityResult<Vec<Entity>> {
    let mut found = Vec::new();
    for result in results {
        match result {
            Ok(entity) => found.push(entity),
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(found)
}
