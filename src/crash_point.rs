//! Crash point injection for durability testing
//!
//! Setting `MULTIREV_CRASH_POINT=<name>` makes the process abort the moment
//! execution reaches the named point. No cleanup, no unwinding.
//!
//! ```bash
//! MULTIREV_CRASH_POINT=entity_after_index_pending multirev revisions ...
//! ```

use std::sync::OnceLock;

static CRASH_POINT: OnceLock<Option<String>> = OnceLock::new();

#[inline]
fn get_crash_point() -> Option<&'static str> {
    CRASH_POINT
        .get_or_init(|| std::env::var("MULTIREV_CRASH_POINT").ok())
        .as_deref()
}

/// Returns true if `MULTIREV_CRASH_POINT` equals `name`.
#[inline]
pub fn crash_point_enabled(name: &str) -> bool {
    get_crash_point().map(|p| p == name).unwrap_or(false)
}

/// Abort the process if the named crash point is enabled; otherwise a no-op.
#[inline]
pub fn maybe_crash(name: &str) {
    if crash_point_enabled(name) {
        eprintln!("[CRASH] Triggering crash at point: {}", name);
        std::process::abort();
    }
}

/// All defined crash point names
pub mod points {
    // Revision index journal
    pub const INDEX_BEFORE_APPEND: &str = "index_before_append";
    pub const INDEX_AFTER_APPEND: &str = "index_after_append";

    // Workspace association journal
    pub const ASSOCIATION_BEFORE_APPEND: &str = "association_before_append";

    // Save protocol
    pub const ENTITY_AFTER_INDEX_PENDING: &str = "entity_after_index_pending";
    pub const ENTITY_AFTER_FIELD_WRITE: &str = "entity_after_field_write";
    pub const ENTITY_BEFORE_TRACK: &str = "entity_before_track";

    pub fn all() -> &'static [&'static str] {
        &[
            INDEX_BEFORE_APPEND,
            INDEX_AFTER_APPEND,
            ASSOCIATION_BEFORE_APPEND,
            ENTITY_AFTER_INDEX_PENDING,
            ENTITY_AFTER_FIELD_WRITE,
            ENTITY_BEFORE_TRACK,
        ]
    }
}
