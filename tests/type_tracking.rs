//! Version tracking toggles persisted through the config file
//!
//! - Enabling a type survives a reload and lets storage open for it
//! - Disabling a type survives a reload and refuses storage for it
//! - A failed config write leaves the tracker unchanged

mod common;

use common::{ws, FlakyFieldStore};
use multirev::entity::{FileEntityStorage, StaticTypeRegistry, TypeTracker};
use multirev::StorageConfig;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn registry() -> StaticTypeRegistry {
    StaticTypeRegistry::new(["node", "taxonomy_term", "block_content"])
}

fn write_config(dir: &Path, types: &[&str]) -> PathBuf {
    let path = dir.join("multirev.json");
    StorageConfig::with_data_dir(dir.join("data"), types.iter().copied())
        .save(&path)
        .unwrap();
    path
}

fn open(config: &StorageConfig, entity_type: &str) -> multirev::entity::EntityResult<FileEntityStorage<FlakyFieldStore>> {
    FileEntityStorage::open(config, &registry(), entity_type, FlakyFieldStore::default())
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_enabled_type_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), &["node"]);

    let before = StorageConfig::load(&path).unwrap();
    assert!(open(&before, "taxonomy_term").is_err());

    let mut tracker = TypeTracker::load(&path, registry()).unwrap();
    assert!(tracker.enable_type("taxonomy_term").unwrap());
    assert_eq!(tracker.config_path(), Some(path.as_path()));

    let reloaded = StorageConfig::load(&path).unwrap();
    assert!(reloaded.is_supported("taxonomy_term"));
    assert!(reloaded.is_supported("node"));

    let mut storage = open(&reloaded, "taxonomy_term").unwrap();
    let term = storage.create(json!({"name": "rust"}), &ws("live")).unwrap();
    assert_eq!(term.revision().map(|r| r.generation()), Some(1));
}

#[test]
fn test_disabled_type_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), &["node", "block_content"]);

    let mut tracker = TypeTracker::load(&path, registry()).unwrap();
    assert_eq!(tracker.disable_types(&["block_content", "user"]).unwrap(), 1);

    let reloaded = StorageConfig::load(&path).unwrap();
    assert_eq!(reloaded.supported_entity_types, ["node".to_string()]);

    let err = open(&reloaded, "block_content").unwrap_err();
    assert_eq!(err.code(), "MULTIREV_ENTITY_VALIDATION");
}

#[test]
fn test_unchanged_enable_does_not_rewrite() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), &["node"]);
    let mut tracker = TypeTracker::load(&path, registry()).unwrap();

    // any write would recreate the file
    fs::remove_file(&path).unwrap();
    assert!(!tracker.enable_type("node").unwrap());
    assert!(!path.exists());
}

#[test]
fn test_failed_write_leaves_tracker_unchanged() {
    let dir = TempDir::new().unwrap();
    let conf_dir = dir.path().join("conf");
    fs::create_dir(&conf_dir).unwrap();
    let path = write_config(&conf_dir, &["node"]);

    let mut tracker = TypeTracker::load(&path, registry()).unwrap();
    fs::remove_dir_all(&conf_dir).unwrap();

    let err = tracker
        .enable_types(&["taxonomy_term", "block_content"])
        .unwrap_err();
    assert_eq!(err.code(), "MULTIREV_CONFIG_WRITE_FAILED");
    assert_eq!(tracker.enabled_types(), ["node".to_string()]);
}
