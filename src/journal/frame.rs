//! Journal frame encoding
//!
//! A frame is the unit of durability: it is either fully present with a
//! matching checksum or the journal is corrupt.

use std::io;

use super::checksum::compute_checksum;

/// Length + kind + checksum.
pub(crate) const FRAME_OVERHEAD: usize = 4 + 1 + 4;

/// A single journal frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Caller-defined discriminator for the body layout
    pub kind: u8,
    /// Caller-encoded body
    pub body: Vec<u8>,
}

impl Frame {
    pub fn new(kind: u8, body: Vec<u8>) -> Self {
        Self { kind, body }
    }

    /// Serialize the complete frame including length prefix and checksum.
    pub fn serialize(&self) -> Vec<u8> {
        let frame_length = (FRAME_OVERHEAD + self.body.len()) as u32;

        let mut frame = Vec::with_capacity(frame_length as usize);
        frame.extend_from_slice(&frame_length.to_le_bytes());
        frame.push(self.kind);
        frame.extend_from_slice(&self.body);

        let checksum = compute_checksum(&frame);
        frame.extend_from_slice(&checksum.to_le_bytes());
        frame
    }

    /// Deserialize a frame from bytes, verifying its checksum.
    ///
    /// Returns the frame and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < FRAME_OVERHEAD {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Frame too short",
            ));
        }

        let frame_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if frame_length < FRAME_OVERHEAD {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid frame length: {}", frame_length),
            ));
        }
        if data.len() < frame_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Frame truncated: expected {} bytes, got {}",
                    frame_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = frame_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[..checksum_offset]);
        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        Ok((
            Self {
                kind: data[4],
                body: data[5..checksum_offset].to_vec(),
            },
            frame_length,
        ))
    }
}
