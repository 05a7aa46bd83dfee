//! Operational counters
//!
//! - Counters only, monotonic
//! - Reset only when the registry is created
//! - Lock-free

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by one storage instance.
///
/// Relaxed ordering throughout: the values are exact once writers are quiet,
/// but no happens-before is implied between counters.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    revisions_indexed: AtomicU64,
    revisions_committed: AtomicU64,
    revisions_reused: AtomicU64,
    revisions_orphaned: AtomicU64,
    persistence_failures: AtomicU64,
    isolation_violations: AtomicU64,
    loads: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_revisions_indexed(&self) {
        self.revisions_indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_revisions_committed(&self) {
        self.revisions_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_revisions_reused(&self) {
        self.revisions_reused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_revisions_orphaned(&self) {
        self.revisions_orphaned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_persistence_failures(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_isolation_violations(&self) {
        self.isolation_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts entities returned by load operations, not calls.
    pub fn add_loads(&self, count: u64) {
        self.loads.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            revisions_indexed: self.revisions_indexed.load(Ordering::Relaxed),
            revisions_committed: self.revisions_committed.load(Ordering::Relaxed),
            revisions_reused: self.revisions_reused.load(Ordering::Relaxed),
            revisions_orphaned: self.revisions_orphaned.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            isolation_violations: self.isolation_violations.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        // MetricsSnapshot only holds integers
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub revisions_indexed: u64,
    pub revisions_committed: u64,
    pub revisions_reused: u64,
    pub revisions_orphaned: u64,
    pub persistence_failures: u64,
    pub isolation_violations: u64,
    pub loads: u64,
}
