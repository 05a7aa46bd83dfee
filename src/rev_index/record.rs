//! On-disk encoding of index entries
//!
//! Body layout (all strings length-prefixed, u32 LE):
//!
//! ```text
//! document uuid | revision | parent? | workspace | deleted (u8) | status (u8)
//! ```

use uuid::Uuid;

use super::{IndexEntry, RevisionStatus};
use crate::journal::{BodyReader, BodyWriter, Frame};
use crate::revision::{DocumentId, RevisionId, WorkspaceId};

/// Frame kind for index entries.
pub(crate) const INDEX_ENTRY_FRAME: u8 = 0x01;

pub(crate) fn encode(entry: &IndexEntry) -> Frame {
    let mut body = BodyWriter::new();
    body.put_str(&entry.document.to_string())
        .put_str(&entry.revision.to_string())
        .put_opt_str(entry.parent.as_ref().map(|p| p.to_string()).as_deref())
        .put_str(entry.workspace.as_str())
        .put_bool(entry.deleted)
        .put_u8(entry.status.tag());
    Frame::new(INDEX_ENTRY_FRAME, body.finish())
}

pub(crate) fn decode(frame: &Frame) -> Result<IndexEntry, String> {
    if frame.kind != INDEX_ENTRY_FRAME {
        return Err(format!("unexpected frame kind {:#04x}", frame.kind));
    }
    let mut body = BodyReader::new(&frame.body);

    let document = body.string().map_err(|e| e.to_string())?;
    let document = Uuid::parse_str(&document)
        .map(DocumentId::from_uuid)
        .map_err(|e| format!("document id: {}", e))?;
    let revision: RevisionId = body
        .string()
        .map_err(|e| e.to_string())?
        .parse()
        .map_err(|e| format!("revision: {}", e))?;
    let parent = match body.opt_string().map_err(|e| e.to_string())? {
        Some(p) => Some(p.parse::<RevisionId>().map_err(|e| format!("parent: {}", e))?),
        None => None,
    };
    let workspace = WorkspaceId::new(body.string().map_err(|e| e.to_string())?)
        .map_err(|e| format!("workspace: {}", e))?;
    let deleted = body.bool().map_err(|e| e.to_string())?;
    let tag = body.u8().map_err(|e| e.to_string())?;
    let status = RevisionStatus::from_tag(tag).ok_or_else(|| format!("unknown status tag {}", tag))?;

    if !body.is_exhausted() {
        return Err("trailing bytes after index entry".to_string());
    }

    Ok(IndexEntry {
        document,
        revision,
        parent,
        workspace,
        deleted,
        status,
    })
}
