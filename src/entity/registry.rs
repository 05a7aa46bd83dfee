//! Record type capabilities and version-tracking toggles

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::errors::{EntityResult, EntityStorageError};
use crate::config::{validate_entity_type, StorageConfig};
use crate::observability::{log_event_with_fields, Event};

/// Answers whether a record type can carry revisions at all.
pub trait TypeRegistry {
    fn is_revisionable(&self, entity_type: &str) -> bool;
}

/// Registry over a fixed set of revision-capable types.
#[derive(Debug, Clone, Default)]
pub struct StaticTypeRegistry {
    revisionable: BTreeSet<String>,
}

impl StaticTypeRegistry {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            revisionable: types.into_iter().map(Into::into).collect(),
        }
    }
}

impl TypeRegistry for StaticTypeRegistry {
    fn is_revisionable(&self, entity_type: &str) -> bool {
        self.revisionable.contains(entity_type)
    }
}

/// Owns the list of version-tracked types and enforces the registry's
/// capability check when types are switched on.
///
/// A tracker opened with [`TypeTracker::load`] writes every change back to
/// its config file before reporting success.
pub struct TypeTracker<R: TypeRegistry> {
    config: StorageConfig,
    config_path: Option<PathBuf>,
    registry: R,
}

impl<R: TypeRegistry> TypeTracker<R> {
    /// Tracker over an in-memory config; changes are not persisted.
    pub fn new(config: StorageConfig, registry: R) -> EntityResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            config_path: None,
            registry,
        })
    }

    /// Tracker over the config file at `path`.
    pub fn load(path: impl Into<PathBuf>, registry: R) -> EntityResult<Self> {
        let path = path.into();
        let config = StorageConfig::load(&path)?;
        Ok(Self {
            config,
            config_path: Some(path),
            registry,
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn into_config(self) -> StorageConfig {
        self.config
    }

    pub fn is_enabled(&self, entity_type: &str) -> bool {
        self.config.is_supported(entity_type)
    }

    pub fn enabled_types(&self) -> &[String] {
        &self.config.supported_entity_types
    }

    /// Turns on version tracking for `entity_type`.
    ///
    /// Returns false if it was already enabled.
    pub fn enable_type(&mut self, entity_type: &str) -> EntityResult<bool> {
        self.enable_types(&[entity_type]).map(|changed| changed > 0)
    }

    /// Turns off version tracking. Existing journals are left on disk.
    ///
    /// Returns false if the type was not enabled.
    pub fn disable_type(&mut self, entity_type: &str) -> EntityResult<bool> {
        self.disable_types(&[entity_type]).map(|changed| changed > 0)
    }

    /// Enables every listed type; nothing changes if any of them is refused
    /// or the config cannot be written.
    pub fn enable_types(&mut self, entity_types: &[&str]) -> EntityResult<usize> {
        if entity_types.is_empty() {
            return Err(EntityStorageError::Validation(
                "no entity types given".to_string(),
            ));
        }
        for entity_type in entity_types {
            validate_entity_type(entity_type)?;
            if !self.registry.is_revisionable(entity_type) {
                return Err(EntityStorageError::Validation(format!(
                    "entity type '{}' is not revisionable",
                    entity_type
                )));
            }
        }

        let before = self.config.supported_entity_types.clone();
        let mut added = Vec::new();
        for entity_type in entity_types {
            if !self.is_enabled(entity_type) {
                self.config
                    .supported_entity_types
                    .push(entity_type.to_string());
                added.push(*entity_type);
            }
        }
        self.persist(before, &added, Event::TypeEnabled)
    }

    pub fn disable_types(&mut self, entity_types: &[&str]) -> EntityResult<usize> {
        if entity_types.is_empty() {
            return Err(EntityStorageError::Validation(
                "no entity types given".to_string(),
            ));
        }

        let before = self.config.supported_entity_types.clone();
        let removed: Vec<&str> = entity_types
            .iter()
            .copied()
            .filter(|t| self.is_enabled(t))
            .collect();
        self.config
            .supported_entity_types
            .retain(|t| !removed.contains(&t.as_str()));
        self.persist(before, &removed, Event::TypeDisabled)
    }

    /// Writes the config back when `changed` is non-empty, restoring
    /// `before` if the write fails.
    fn persist(&mut self, before: Vec<String>, changed: &[&str], event: Event) -> EntityResult<usize> {
        if changed.is_empty() {
            return Ok(0);
        }
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save(path) {
                self.config.supported_entity_types = before;
                return Err(e.into());
            }
        }
        for entity_type in changed {
            log_event_with_fields(event, &[("entity_type", *entity_type)]);
        }
        Ok(changed.len())
    }
}
