//! Storage configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! {
//!   "data_dir": "/var/lib/multirev",
//!   "supported_entity_types": ["node", "taxonomy_term"],
//!   "default_workspace": "live"
//! }
//! ```
//!
//! The configuration is passed explicitly to every storage; there is no
//! process-wide copy.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::revision::WorkspaceId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "MULTIREV_CONFIG_READ_FAILED",
            ConfigError::Write { .. } => "MULTIREV_CONFIG_WRITE_FAILED",
            ConfigError::Parse(_) => "MULTIREV_CONFIG_PARSE_FAILED",
            ConfigError::Invalid(_) => "MULTIREV_CONFIG_INVALID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the durable journals. `None` means in-memory only.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Record types that are version tracked.
    #[serde(default)]
    pub supported_entity_types: Vec<String>,

    /// Workspace used when a caller does not name one.
    #[serde(default = "default_workspace")]
    pub default_workspace: String,
}

fn default_workspace() -> String {
    "live".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            supported_entity_types: Vec::new(),
            default_workspace: default_workspace(),
        }
    }
}

impl StorageConfig {
    /// In-memory configuration tracking `types`.
    pub fn in_memory<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported_entity_types: types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Durable configuration rooted at `data_dir`.
    pub fn with_data_dir<I, S>(data_dir: impl Into<PathBuf>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data_dir: Some(data_dir.into()),
            ..Self::in_memory(types)
        }
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: StorageConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates and writes the config to `path`.
    ///
    /// The file is written to `<path>.tmp`, fsynced and renamed over `path`,
    /// so a reader sees either the old or the new config.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("failed to serialize config: {}", e)))?;

        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let temp_path = path.with_extension("json.tmp");
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        fs::rename(&temp_path, path).map_err(write_err)?;

        if let Some(parent) = path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for entity_type in &self.supported_entity_types {
            validate_entity_type(entity_type)?;
            if !seen.insert(entity_type.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "entity type '{}' listed twice",
                    entity_type
                )));
            }
        }

        WorkspaceId::new(self.default_workspace.as_str())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("data_dir must not be empty".to_string()));
            }
        }

        Ok(())
    }

    pub fn is_supported(&self, entity_type: &str) -> bool {
        self.supported_entity_types.iter().any(|t| t == entity_type)
    }

    pub fn default_workspace_id(&self) -> Result<WorkspaceId, ConfigError> {
        WorkspaceId::new(self.default_workspace.as_str())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Directory holding the journals of `entity_type`.
    pub fn type_dir(&self, entity_type: &str) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(entity_type))
    }
}

/// Entity type ids double as directory names.
pub(crate) fn validate_entity_type(entity_type: &str) -> Result<(), ConfigError> {
    let valid = !entity_type.is_empty()
        && entity_type
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "entity type '{}' must be non-empty lowercase ascii, digits or '_'",
            entity_type
        )))
    }
}
