//! Append-only journal files
//!
//! Both durable stores (the revision index and the workspace association
//! store) persist their state as an append-only sequence of checksummed
//! frames. Replaying a journal front to back rebuilds the in-memory state;
//! the latest frame for a key wins.
//!
//! # Frame layout
//!
//! ```text
//! +------------------+
//! | Frame Length     | (u32 LE, includes length and checksum fields)
//! +------------------+
//! | Frame Kind       | (u8)
//! +------------------+
//! | Body             | (caller-encoded bytes)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 over length + kind + body)
//! +------------------+
//! ```
//!
//! # Invariants
//!
//! - Every append is followed by fsync before it is acknowledged
//! - Every read verifies the checksum
//! - A checksum failure or truncated frame is fatal

mod checksum;
mod codec;
mod errors;
mod frame;
mod reader;
mod writer;

pub use checksum::{compute_checksum, verify_checksum};
pub use codec::{BodyReader, BodyWriter};
pub use errors::{JournalError, JournalErrorCode, JournalResult, Severity};
pub use frame::Frame;
pub use reader::JournalReader;
pub use writer::JournalWriter;
