use std::collections::BTreeSet;

use serde_json::{
    json,
    Value,
};

use crate::core::NoteDraft;

/// Protocol version AnkiConnect expects in every request body.
pub const API_VERSION: u32 = 6;

/// One outbound AnkiConnect call before serialization. The remote store
/// fixes the body shape: `{"action", "version": 6, "params"}`, bit-exact.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub action: &'static str,
    pub params: Option<Value>,
}

impl Request {
    fn new(action: &'static str, params: Option<Value>) -> Self {
        Self { action, params }
    }

    pub fn body(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("action".to_string(), Value::String(self.action.to_string()));
        body.insert("version".to_string(), Value::Number(API_VERSION.into()));
        if let Some(params) = &self.params {
            body.insert("params".to_string(), params.clone());
        }
        Value::Object(body)
    }
}

/// The note object embedded in `addNotes` params.
pub fn note_params(draft: &NoteDraft, allow_duplicate: bool) -> Value {
    json!({
        "deckName": draft.deck,
        "modelName": draft.model,
        "fields": field_map(draft),
        "tags": joined_tags(&draft.tags),
        "options": {
            "allowDuplicate": allow_duplicate,
            "duplicateScope": "deck",
        },
    })
}

pub fn add_notes(notes: Vec<Value>) -> Request {
    Request::new("addNotes", Some(json!({ "notes": notes })))
}

/// An `updateNote` sub-action for nesting inside [`multi`]. Callers must
/// guarantee the draft carries a remote id.
pub fn update_note(draft: &NoteDraft, id: u64) -> Request {
    Request::new(
        "updateNote",
        Some(json!({
            "id": id,
            "fields": field_map(draft),
            "tags": joined_tags(&draft.tags),
        })),
    )
}

/// Wraps sub-actions so the store reports each one's outcome individually.
pub fn multi(actions: Vec<Request>) -> Request {
    let nested: Vec<Value> = actions.iter().map(Request::body).collect();
    Request::new("multi", Some(json!({ "actions": nested })))
}

pub fn delete_notes(ids: &[u64]) -> Request {
    Request::new("deleteNotes", Some(json!({ "notes": ids })))
}

pub fn find_notes(query: &str) -> Request {
    Request::new("findNotes", Some(json!({ "query": query })))
}

pub fn gui_browse(query: &str) -> Request {
    Request::new("guiBrowse", Some(json!({ "query": query })))
}

/// Kicks off the store's own collection sync.
pub fn sync() -> Request {
    Request::new("sync", None)
}

pub fn version() -> Request {
    Request::new("version", None)
}

fn field_map(draft: &NoteDraft) -> Value {
    let mut fields = serde_json::Map::new();
    for (name, value) in &draft.fields {
        fields.insert(name.clone(), Value::String(value.clone()));
    }
    Value::Object(fields)
}

fn joined_tags(tags: &BTreeSet<String>) -> String {
    tags.iter().map(String::as_str).collect::<Vec<&str>>().join(" ")
}
