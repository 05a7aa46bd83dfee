//! File-backed association store
//!
//! Each new pair is appended to the journal and fsynced before it becomes
//! visible. Pairs are never removed, so replay is a plain union.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::set::AssociationSet;
use super::{AssociationError, AssociationResult, WorkspaceAssociationStore};
use crate::crash_point::{maybe_crash, points};
use crate::journal::{BodyReader, BodyWriter, Frame, JournalReader, JournalWriter};
use crate::observability::{log_event_with_fields, Event};
use crate::revision::{DocumentId, WorkspaceId};

pub const ASSOCIATION_FILE_NAME: &str = "workspaces.idx";

const ASSOCIATION_FRAME: u8 = 0x02;

#[derive(Debug)]
pub struct FileAssociationStore {
    path: PathBuf,
    set: AssociationSet,
    writer: JournalWriter,
}

impl FileAssociationStore {
    pub fn open(path: impl AsRef<Path>) -> AssociationResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut set = AssociationSet::default();
        let mut frames = 0usize;

        if let Some(mut reader) = JournalReader::open(&path)? {
            loop {
                let offset = reader.current_offset();
                let Some(frame) = reader.read_next()? else {
                    break;
                };
                let (entity, workspace) =
                    decode(&frame).map_err(|reason| AssociationError::Corrupt { offset, reason })?;
                set.insert(entity, workspace);
                frames += 1;
            }
        }

        let writer = JournalWriter::open(&path)?;
        log_event_with_fields(
            Event::JournalReplayed,
            &[
                ("path", &path.display().to_string()),
                ("frames", &frames.to_string()),
                ("entries", &set.len().to_string()),
            ],
        );

        Ok(Self { path, set, writer })
    }

    pub fn open_in_dir(dir: impl AsRef<Path>) -> AssociationResult<Self> {
        Self::open(dir.as_ref().join(ASSOCIATION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkspaceAssociationStore for FileAssociationStore {
    fn track(&mut self, entity: &DocumentId, workspace: &WorkspaceId) -> AssociationResult<bool> {
        if self.set.contains(entity, workspace) {
            return Ok(false);
        }
        maybe_crash(points::ASSOCIATION_BEFORE_APPEND);
        self.writer.append(&encode(entity, workspace))?;
        Ok(self.set.insert(*entity, workspace.clone()))
    }

    fn tracking_workspace_ids(&self, entity: &DocumentId) -> AssociationResult<BTreeSet<WorkspaceId>> {
        Ok(self.set.workspaces_of(entity))
    }

    fn tracked_entities(&self, workspace: &WorkspaceId) -> AssociationResult<BTreeSet<DocumentId>> {
        Ok(self.set.entities_of(workspace))
    }
}

fn encode(entity: &DocumentId, workspace: &WorkspaceId) -> Frame {
    let mut body = BodyWriter::new();
    body.put_str(&entity.to_string()).put_str(workspace.as_str());
    Frame::new(ASSOCIATION_FRAME, body.finish())
}

fn decode(frame: &Frame) -> Result<(DocumentId, WorkspaceId), String> {
    if frame.kind != ASSOCIATION_FRAME {
        return Err(format!("unexpected frame kind {:#04x}", frame.kind));
    }
    let mut body = BodyReader::new(&frame.body);
    let entity = body.string().map_err(|e| e.to_string())?;
    let entity = Uuid::parse_str(&entity)
        .map(DocumentId::from_uuid)
        .map_err(|e| format!("entity id: {}", e))?;
    let workspace = WorkspaceId::new(body.string().map_err(|e| e.to_string())?)
        .map_err(|e| format!("workspace: {}", e))?;
    if !body.is_exhausted() {
        return Err("trailing bytes after association".to_string());
    }
    Ok((entity, workspace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_associations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let entity = DocumentId::generate();
        let alpha = WorkspaceId::new("alpha").unwrap();

        {
            let mut store = FileAssociationStore::open_in_dir(dir.path()).unwrap();
            assert!(store.track(&entity, &alpha).unwrap());
        }

        let mut store = FileAssociationStore::open_in_dir(dir.path()).unwrap();
        assert!(store.is_tracked(&entity, &alpha).unwrap());
        assert!(!store.track(&entity, &alpha).unwrap());
    }

    #[test]
    fn test_repeat_track_appends_nothing() {
        let dir = TempDir::new().unwrap();
        let entity = DocumentId::generate();
        let alpha = WorkspaceId::new("alpha").unwrap();

        let mut store = FileAssociationStore::open_in_dir(dir.path()).unwrap();
        store.track(&entity, &alpha).unwrap();
        let size = fs::metadata(store.path()).unwrap().len();
        store.track(&entity, &alpha).unwrap();
        assert_eq!(fs::metadata(store.path()).unwrap().len(), size);
    }

    #[test]
    fn test_wrong_frame_kind_is_corrupt() {
        let frame = Frame::new(0x01, Vec::new());
        assert!(decode(&frame).unwrap_err().contains("frame kind"));
    }
}
