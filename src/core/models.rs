use std::{
    collections::BTreeSet,
    fmt,
};

/// Opaque reference back to an entry's location in the host document. Only
/// used to route reconciliation results; never sent to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Anchor(pub u64);

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// One candidate note derived from a document entry for a single sync pass.
/// Drafts are never persisted; only `remote_id` and `content_hash` survive,
/// written back through the document host after a confirmed remote response.
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub remote_id: Option<u64>,
    /// Field name/value pairs in the note type's schema order. Keys always
    /// exactly match the schema; a field the document has no content for is
    /// the empty string.
    pub fields: Vec<(String, String)>,
    pub tags: BTreeSet<String>,
    pub deck: String,
    pub model: String,
    pub anchor: Anchor,
    /// Fingerprint over `fields` and `tags` only.
    pub content_hash: String,
}

/// Verdict of the diff engine for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Skip,
    Create,
    Update,
    Delete,
}

/// Terminal, human-readable outcome of a sync pass or a reconciliation.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Per-entry failure lines and informational notes.
    pub details: Vec<String>,
}

impl SyncReport {
    pub fn merge(&mut self, other: SyncReport) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.details.extend(other.details);
    }

    pub fn failure(&mut self, line: String) {
        self.failed += 1;
        self.details.push(line);
    }

    pub fn summary(&self) -> String {
        format!("{} succeeded, {} failed, {} skipped", self.succeeded, self.failed, self.skipped)
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
