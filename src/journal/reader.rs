//! Journal reader with strict corruption detection
//!
//! Frames are read sequentially from the start of the file. Any checksum
//! failure or truncated trailing frame is reported as corruption.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::errors::{JournalError, JournalResult};
use super::frame::{Frame, FRAME_OVERHEAD};
use crate::observability::{log_event_with_fields, Event};

/// Sequential reader over a journal file.
pub struct JournalReader {
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl JournalReader {
    /// Opens the journal at `path` for reading.
    ///
    /// Returns `Ok(None)` when the file does not exist yet.
    pub fn open(path: &Path) -> JournalResult<Option<Self>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(JournalError::read_failed(
                    format!("Failed to open journal: {}", path.display()),
                    e,
                ))
            }
        };

        let file_size = file
            .metadata()
            .map_err(|e| JournalError::read_failed("Failed to read journal metadata", e))?
            .len();

        Ok(Some(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        }))
    }

    /// Returns the current read offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next frame.
    ///
    /// - `Ok(Some(frame))` if a frame was read
    /// - `Ok(None)` at end of file
    /// - `Err(MULTIREV_JOURNAL_CORRUPTION)` on checksum failure or truncation
    pub fn read_next(&mut self) -> JournalResult<Option<Frame>> {
        self.read_frame().map_err(|e| {
            if e.is_fatal() {
                log_event_with_fields(
                    Event::JournalCorruption,
                    &[
                        ("offset", &self.current_offset.to_string()),
                        ("reason", e.details().unwrap_or(e.message())),
                    ],
                );
            }
            e
        })
    }

    fn read_frame(&mut self) -> JournalResult<Option<Frame>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < FRAME_OVERHEAD as u64 {
            return Err(JournalError::corruption_at_offset(
                self.current_offset,
                format!("Truncated journal: {} trailing bytes", remaining),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            JournalError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read frame length: {}", e),
            )
        })?;
        let frame_length = u32::from_le_bytes(len_buf) as u64;

        if frame_length < FRAME_OVERHEAD as u64 || frame_length > remaining {
            return Err(JournalError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Invalid frame length {} with {} bytes remaining",
                    frame_length, remaining
                ),
            ));
        }

        let mut data = vec![0u8; frame_length as usize];
        data[..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut data[4..]).map_err(|e| {
            JournalError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read frame body: {}", e),
            )
        })?;

        let (frame, consumed) = Frame::deserialize(&data)
            .map_err(|e| JournalError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;
        Ok(Some(frame))
    }

    /// Reads every remaining frame.
    pub fn read_all(&mut self) -> JournalResult<Vec<Frame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.read_next()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}
