//! Journal writer with fsync enforcement
//!
//! Every append is written and fsynced before returning. The caller may only
//! treat a frame as durable once `append` has returned `Ok`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{JournalError, JournalResult};
use super::frame::Frame;

/// Append-only writer for a single journal file.
#[derive(Debug)]
pub struct JournalWriter {
    path: PathBuf,
    file: File,
    current_offset: u64,
}

impl JournalWriter {
    /// Opens or creates the journal at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `MULTIREV_JOURNAL_IO_ERROR` if the file or its directory
    /// cannot be created.
    pub fn open(path: &Path) -> JournalResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    JournalError::io_error(
                        format!("Failed to create journal directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                JournalError::io_error(format!("Failed to open journal: {}", path.display()), e)
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| JournalError::io_error("Failed to read journal metadata", e))?
            .len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            current_offset,
        })
    }

    /// Returns the journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the offset the next frame will be written at.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Appends a frame and fsyncs the file.
    ///
    /// Returns the byte offset where the frame was written.
    pub fn append(&mut self, frame: &Frame) -> JournalResult<u64> {
        let serialized = frame.serialize();
        let offset = self.current_offset;

        self.file.write_all(&serialized).map_err(|e| {
            JournalError::write_failed(
                format!("Failed to append frame at offset {}", offset),
                e,
            )
        })?;

        self.file.sync_all().map_err(|e| {
            JournalError::write_failed(
                format!("fsync failed after frame at offset {}", offset),
                e,
            )
        })?;

        self.current_offset += serialized.len() as u64;
        Ok(offset)
    }
}
