use std::collections::{
    BTreeMap,
    HashMap,
};

use regex::Regex;

use super::{
    DocumentHost,
    MetaKey,
};
use crate::core::Anchor;

/// One heading with its properties, tags, and field content.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntry {
    pub title: String,
    pub properties: HashMap<String, String>,
    pub tags: Vec<String>,
    pub fields: HashMap<String, String>,
}

/// In-memory reference host. The test suite runs against it, and it doubles
/// as executable documentation of the [`DocumentHost`] contract: document
/// level properties and tags act as the inherited tier for every entry.
///
/// `select` understands a minimal match grammar:
/// empty or `None` matches everything, `tag:<name>` matches entries carrying
/// the tag (inherited included), `prop:<KEY>=<VALUE>` matches on an
/// entry-local property, `title:<regex>` matches on the heading title.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    entries: BTreeMap<u64, MemoryEntry>,
    pub document_properties: HashMap<String, String>,
    pub document_tags: Vec<String>,
    next_id: u64,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: MemoryEntry) -> Anchor {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, entry);
        Anchor(id)
    }

    pub fn entry(&self, anchor: Anchor) -> Option<&MemoryEntry> {
        self.entries.get(&anchor.0)
    }

    pub fn set_field(&mut self, anchor: Anchor, field: &str, content: &str) {
        if let Some(entry) = self.entries.get_mut(&anchor.0) {
            entry.fields.insert(field.to_string(), content.to_string());
        }
    }

    fn matches(&self, entry: &MemoryEntry, expr: &str) -> bool {
        if let Some(tag) = expr.strip_prefix("tag:") {
            return entry.tags.iter().any(|t| t == tag)
                || self.document_tags.iter().any(|t| t == tag);
        }
        if let Some(rest) = expr.strip_prefix("prop:") {
            return match rest.split_once('=') {
                Some((key, value)) => entry.properties.get(key).map(String::as_str) == Some(value),
                None => entry.properties.contains_key(rest),
            };
        }
        if let Some(pattern) = expr.strip_prefix("title:") {
            return match Regex::new(pattern) {
                Ok(re) => re.is_match(&entry.title),
                Err(_) => false,
            };
        }
        // Unknown expressions select nothing rather than everything.
        false
    }
}

impl DocumentHost for MemoryDocument {
    fn select(&self, match_expr: Option<&str>) -> Vec<Anchor> {
        self.entries
            .iter()
            .filter(|(_, entry)| match match_expr {
                None | Some("") => true,
                Some(expr) => self.matches(entry, expr),
            })
            .map(|(id, _)| Anchor(*id))
            .collect()
    }

    fn property(&self, anchor: Anchor, key: MetaKey) -> Option<String> {
        self.entries.get(&anchor.0)?.properties.get(key.as_str()).cloned()
    }

    fn inherited_property(&self, _anchor: Anchor, key: MetaKey) -> Option<String> {
        self.document_properties.get(key.as_str()).cloned()
    }

    fn global_property(&self, key: MetaKey) -> Option<String> {
        self.document_properties.get(key.as_str()).cloned()
    }

    fn set_property(&mut self, anchor: Anchor, key: MetaKey, value: &str) {
        if let Some(entry) = self.entries.get_mut(&anchor.0) {
            entry.properties.insert(key.as_str().to_string(), value.to_string());
        }
    }

    fn clear_property(&mut self, anchor: Anchor, key: MetaKey) {
        if let Some(entry) = self.entries.get_mut(&anchor.0) {
            entry.properties.remove(key.as_str());
        }
    }

    fn tags(&self, anchor: Anchor) -> Vec<String> {
        self.entries.get(&anchor.0).map(|e| e.tags.clone()).unwrap_or_default()
    }

    fn inherited_tags(&self, _anchor: Anchor) -> Vec<String> {
        self.document_tags.clone()
    }

    fn field_source(&self, anchor: Anchor, field: &str) -> Option<String> {
        self.entries.get(&anchor.0)?.fields.get(field).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, tags: &[&str]) -> MemoryEntry {
        MemoryEntry {
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn select_all_when_no_expression() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_entry(entry("one", &[]));
        let b = doc.add_entry(entry("two", &[]));
        assert_eq!(doc.select(None), vec![a, b]);
        assert_eq!(doc.select(Some("")), vec![a, b]);
    }

    #[test]
    fn select_by_tag_includes_document_tags() {
        let mut doc = MemoryDocument::new();
        let tagged = doc.add_entry(entry("one", &["drill"]));
        let plain = doc.add_entry(entry("two", &[]));
        assert_eq!(doc.select(Some("tag:drill")), vec![tagged]);

        doc.document_tags.push("drill".to_string());
        assert_eq!(doc.select(Some("tag:drill")), vec![tagged, plain]);
    }

    #[test]
    fn select_by_property_and_title() {
        let mut doc = MemoryDocument::new();
        let mut with_prop = entry("Kanji readings", &[]);
        with_prop.properties.insert("ANKI_DECK".to_string(), "JP".to_string());
        let a = doc.add_entry(with_prop);
        doc.add_entry(entry("Grammar", &[]));

        assert_eq!(doc.select(Some("prop:ANKI_DECK=JP")), vec![a]);
        assert_eq!(doc.select(Some("prop:ANKI_DECK")), vec![a]);
        assert_eq!(doc.select(Some("title:^Kanji")), vec![a]);
        assert!(doc.select(Some("bogus")).is_empty());
    }

    #[test]
    fn properties_round_trip_through_the_trait() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_entry(entry("one", &[]));
        assert_eq!(doc.property(a, MetaKey::NoteId), None);

        doc.set_property(a, MetaKey::NoteId, "55");
        assert_eq!(doc.property(a, MetaKey::NoteId).as_deref(), Some("55"));

        doc.clear_property(a, MetaKey::NoteId);
        assert_eq!(doc.property(a, MetaKey::NoteId), None);
    }
}
