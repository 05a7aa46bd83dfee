//! Observable events
//!
//! Events are explicit and typed. Each maps to a fixed upper-case name used
//! as the `event` field of a log line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// Record type enabled for version tracking
    TypeEnabled,
    /// Record type disabled
    TypeDisabled,

    // Journals
    /// A journal file was replayed on open
    JournalReplayed,
    /// Journal checksum failure (FATAL)
    JournalCorruption,

    // Write path
    /// Write intent recorded as a pending index entry
    RevisionIndexed,
    /// Field write succeeded and the entry became available
    RevisionCommitted,
    /// A retry completed an existing pending revision
    RevisionReused,
    /// A stale pending revision was abandoned
    RevisionOrphaned,
    /// The field store rejected a write; the pending entry stays
    PersistenceFailed,
    /// First save of an entity in a workspace
    WorkspaceTracked,

    // Read path
    /// Read refused because the revision belongs to another workspace
    IsolationViolation,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TypeEnabled => "TYPE_ENABLED",
            Event::TypeDisabled => "TYPE_DISABLED",

            Event::JournalReplayed => "JOURNAL_REPLAYED",
            Event::JournalCorruption => "JOURNAL_CORRUPTION",

            Event::RevisionIndexed => "REVISION_INDEXED",
            Event::RevisionCommitted => "REVISION_COMMITTED",
            Event::RevisionReused => "REVISION_REUSED",
            Event::RevisionOrphaned => "REVISION_ORPHANED",
            Event::PersistenceFailed => "PERSISTENCE_FAILED",
            Event::WorkspaceTracked => "WORKSPACE_TRACKED",

            Event::IsolationViolation => "WORKSPACE_ISOLATION_VIOLATION",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::JournalCorruption)
    }

    /// Events that report a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::PersistenceFailed | Event::IsolationViolation)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
