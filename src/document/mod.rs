use crate::core::Anchor;

pub mod memory;

pub use memory::MemoryDocument;

/// Per-entry metadata the engine reads and writes through the host. The
/// string forms are the property names as they appear in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    NoteId,
    NoteHash,
    Deck,
    NoteType,
    Match,
}

impl MetaKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaKey::NoteId => "ANKI_NOTE_ID",
            MetaKey::NoteHash => "ANKI_NOTE_HASH",
            MetaKey::Deck => "ANKI_DECK",
            MetaKey::NoteType => "ANKI_NOTE_TYPE",
            MetaKey::Match => "ANKI_MATCH",
        }
    }
}

/// The engine's window onto the outline document. The host owns traversal,
/// property storage, and tag inheritance; the engine only ever addresses
/// entries through the opaque [`Anchor`]s returned by [`select`].
///
/// The engine is the sole writer of [`MetaKey::NoteId`] and
/// [`MetaKey::NoteHash`], and writes them only after a confirmed remote
/// response.
///
/// [`select`]: DocumentHost::select
pub trait DocumentHost {
    /// Entries matching a host-interpreted match expression. `None` selects
    /// every entry.
    fn select(&self, match_expr: Option<&str>) -> Vec<Anchor>;

    /// Entry-local property.
    fn property(&self, anchor: Anchor, key: MetaKey) -> Option<String>;

    /// Property resolved through the host's inherited/global tiers, entry
    /// excluded.
    fn inherited_property(&self, anchor: Anchor, key: MetaKey) -> Option<String>;

    /// Document-global property, resolvable without an entry in hand.
    fn global_property(&self, key: MetaKey) -> Option<String>;

    fn set_property(&mut self, anchor: Anchor, key: MetaKey, value: &str);

    fn clear_property(&mut self, anchor: Anchor, key: MetaKey);

    /// Tags set directly on the entry.
    fn tags(&self, anchor: Anchor) -> Vec<String>;

    /// Tags the entry inherits from ancestors or the document.
    fn inherited_tags(&self, anchor: Anchor) -> Vec<String>;

    /// Raw pre-render source content of one named field, or `None` when the
    /// entry has nothing for it.
    fn field_source(&self, anchor: Anchor, field: &str) -> Option<String>;
}
