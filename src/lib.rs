//! Synchronizes outline-style documents (headings, properties, tags) with an
//! Anki collection through the AnkiConnect HTTP API.
//!
//! The host document and the markup renderer are collaborators behind the
//! [`document::DocumentHost`] and [`render::Renderer`] traits; this crate owns
//! extraction, change detection, batching, asynchronous dispatch, and the
//! write-back of remote ids and content hashes.

pub mod anki;
pub mod config;
pub mod core;
pub mod diff;
pub mod document;
pub mod extract;
pub mod fingerprint;
pub mod render;
pub mod sync;
pub mod transport;

pub use crate::config::SyncConfig;
pub use crate::core::{
    Anchor,
    BridgeError,
    NoteDraft,
    SyncAction,
    SyncReport,
};
pub use crate::sync::engine::SyncEngine;
