//! File-backed revision index
//!
//! Every `put` that changes state appends one frame to the journal and
//! fsyncs it before the in-memory view is updated. Opening the index replays
//! the journal; the latest frame for a `(document, revision)` wins.
//!
//! A journal that fails checksum verification cannot be opened.

use std::path::{Path, PathBuf};

use super::record;
use super::state::{IndexState, PutPlan};
use super::{IndexEntry, IndexError, IndexResult, RevisionIndex};
use crate::crash_point::{maybe_crash, points};
use crate::journal::{JournalReader, JournalWriter};
use crate::observability::{log_event_with_fields, Event};
use crate::revision::{DocumentId, RevisionId};

/// Journal file name inside a record type's directory.
pub const INDEX_FILE_NAME: &str = "revisions.idx";

/// Durable revision index backed by an append-only journal.
#[derive(Debug)]
pub struct FileRevisionIndex {
    path: PathBuf,
    state: IndexState,
    writer: JournalWriter,
}

impl FileRevisionIndex {
    /// Opens (or creates) the index journal at `path` and replays it.
    pub fn open(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut state = IndexState::new();
        let mut frames = 0usize;

        if let Some(mut reader) = JournalReader::open(&path)? {
            loop {
                let offset = reader.current_offset();
                let Some(frame) = reader.read_next()? else {
                    break;
                };
                let entry = record::decode(&frame)
                    .map_err(|reason| IndexError::Corrupt { offset, reason })?;
                state.apply(entry);
                frames += 1;
            }
        }

        let writer = JournalWriter::open(&path)?;

        log_event_with_fields(
            Event::JournalReplayed,
            &[
                ("path", &path.display().to_string()),
                ("frames", &frames.to_string()),
                ("entries", &state.len().to_string()),
            ],
        );

        Ok(Self {
            path,
            state,
            writer,
        })
    }

    /// Opens the index stored in `dir` under the default file name.
    pub fn open_in_dir(dir: impl AsRef<Path>) -> IndexResult<Self> {
        Self::open(dir.as_ref().join(INDEX_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RevisionIndex for FileRevisionIndex {
    fn put(&mut self, entry: IndexEntry) -> IndexResult<()> {
        if self.state.plan(&entry)? == PutPlan::Unchanged {
            return Ok(());
        }

        maybe_crash(points::INDEX_BEFORE_APPEND);
        self.writer.append(&record::encode(&entry))?;
        maybe_crash(points::INDEX_AFTER_APPEND);

        self.state.apply(entry);
        Ok(())
    }

    fn get(&self, document: &DocumentId, revision: &RevisionId) -> IndexResult<IndexEntry> {
        self.state.get(document, revision)
    }

    fn list_for_document(&self, document: &DocumentId) -> IndexResult<Vec<IndexEntry>> {
        Ok(self.state.list_for_document(document))
    }

    fn documents(&self) -> IndexResult<Vec<DocumentId>> {
        Ok(self.state.documents())
    }
}
