//! CLI command implementations
//!
//! Commands read the journals of one record type and never write to them.
//! Each returns the `data` part of the response; `run` wraps it in the
//! envelope.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::config::StorageConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::rev_index::{FileRevisionIndex, IndexEntry, RevisionIndex, INDEX_FILE_NAME};
use crate::rev_tree::RevisionTree;
use crate::revision::{DocumentId, WorkspaceId};
use crate::workspace::{FileAssociationStore, WorkspaceAssociationStore, ASSOCIATION_FILE_NAME};

use super::args::{Command, Target};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Parse arguments, run the command and print the response.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Revisions { target, workspace } => revisions(&target, workspace.as_deref()),
        Command::Branches { target, workspace } => branches(&target, workspace.as_deref()),
        Command::Workspaces { target } => workspaces(&target),
    }
}

/// All index entries of a document, optionally limited to one workspace.
pub fn revisions(target: &Target, workspace: Option<&str>) -> CliResult<Value> {
    let opened = Opened::new(target)?;
    let index = opened.index()?;
    let workspace = workspace.map(WorkspaceId::new).transpose()?;

    let entries: Vec<IndexEntry> = index
        .list_for_document(&opened.document)?
        .into_iter()
        .filter(|e| workspace.as_ref().map_or(true, |w| &e.workspace == w))
        .collect();

    Ok(json!({
        "entity_type": target.entity_type,
        "document": opened.document,
        "revisions": entries,
    }))
}

/// The revision tree of a document as seen from one workspace.
pub fn branches(target: &Target, workspace: Option<&str>) -> CliResult<Value> {
    let opened = Opened::new(target)?;
    let index = opened.index()?;
    let workspace = match workspace {
        Some(w) => WorkspaceId::new(w)?,
        None => opened.config.default_workspace_id()?,
    };

    let tree = RevisionTree::build_for_workspace(
        opened.document,
        &workspace,
        index.list_for_document(&opened.document)?,
    );

    let default_branch: Vec<Value> = tree
        .default_branch_with_status()
        .into_iter()
        .map(|(rev, status)| json!({"revision": rev, "status": status}))
        .collect();

    Ok(json!({
        "entity_type": target.entity_type,
        "document": opened.document,
        "workspace": workspace,
        "winner": tree.winner(),
        "committed_tip": tree.committed_tip().map(|n| &n.revision),
        "committed_branch": tree.committed_branch(),
        "default_branch": default_branch,
        "branches": tree.branches(),
        "conflicts": tree.conflicts(),
        "orphaned": tree.orphaned(),
        "detached": tree.detached(),
    }))
}

/// Workspaces tracking a document.
pub fn workspaces(target: &Target) -> CliResult<Value> {
    let opened = Opened::new(target)?;
    let path = opened.type_dir.join(ASSOCIATION_FILE_NAME);
    let tracked = if path.exists() {
        FileAssociationStore::open(&path)?.tracking_workspace_ids(&opened.document)?
    } else {
        Default::default()
    };

    Ok(json!({
        "entity_type": target.entity_type,
        "document": opened.document,
        "workspaces": tracked,
    }))
}

/// Config, type directory and document id resolved from a `Target`.
struct Opened {
    config: StorageConfig,
    type_dir: PathBuf,
    document: DocumentId,
}

impl Opened {
    fn new(target: &Target) -> CliResult<Self> {
        let config = StorageConfig::load(&target.config)?;
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", &target.config.display().to_string())],
        );

        if !config.is_supported(&target.entity_type) {
            return Err(CliError::invalid_argument(format!(
                "entity type '{}' is not enabled in {}",
                target.entity_type,
                target.config.display()
            )));
        }
        let type_dir = config
            .type_dir(&target.entity_type)
            .ok_or_else(|| CliError::config_error("data_dir is not configured"))?;
        let document: DocumentId = target.document.parse()?;

        Ok(Self {
            config,
            type_dir,
            document,
        })
    }

    /// Opens the index journal. A missing journal is an error so that a
    /// diagnostic never creates one.
    fn index(&self) -> CliResult<FileRevisionIndex> {
        let path = self.type_dir.join(INDEX_FILE_NAME);
        if !path.exists() {
            return Err(CliError::not_initialized(
                &self.type_dir.display().to_string(),
            ));
        }
        Ok(FileRevisionIndex::open(&path)?)
    }
}
