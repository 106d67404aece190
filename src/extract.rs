use std::collections::BTreeSet;

use crate::{
    config::SyncConfig,
    core::{
        Anchor,
        BridgeError,
        NoteDraft,
    },
    document::{
        DocumentHost,
        MetaKey,
    },
    fingerprint::fingerprint,
};

/// Builds the normalized draft for one entry.
///
/// Deck and note type resolve through a fixed precedence: entry-local
/// property, then the host's inherited/global tier, then the configured
/// default. A property unresolved through all three tiers is fatal for this
/// entry only. Fields come out in the note type's schema order; a field the
/// entry has no content for becomes the empty string so keys always exactly
/// match the schema.
pub fn extract(
    host: &impl DocumentHost,
    config: &SyncConfig,
    anchor: Anchor,
) -> Result<NoteDraft, BridgeError> {
    let deck = resolve(host, anchor, MetaKey::Deck, config.default_deck.as_deref())?;
    let model = resolve(host, anchor, MetaKey::NoteType, config.default_model.as_deref())?;

    let schema = config
        .models
        .get(&model)
        .ok_or_else(|| BridgeError::UnknownModel(model.clone()))?;

    let fields: Vec<(String, String)> = schema
        .iter()
        .map(|name| (name.clone(), host.field_source(anchor, name).unwrap_or_default()))
        .collect();

    let mut tags: BTreeSet<String> = host.tags(anchor).into_iter().collect();
    tags.extend(host.inherited_tags(anchor));
    tags.extend(config.global_tags.iter().cloned());

    let remote_id = host.property(anchor, MetaKey::NoteId).and_then(|raw| raw.parse::<u64>().ok());

    let content_hash = fingerprint(&fields, &tags);

    Ok(NoteDraft { remote_id, fields, tags, deck, model, anchor, content_hash })
}

fn resolve(
    host: &impl DocumentHost,
    anchor: Anchor,
    key: MetaKey,
    default: Option<&str>,
) -> Result<String, BridgeError> {
    host.property(anchor, key)
        .or_else(|| host.inherited_property(anchor, key))
        .or_else(|| default.map(str::to_string))
        .filter(|value| !value.is_empty())
        .ok_or_else(|| BridgeError::MissingProperty { key: key.as_str().to_string() })
}
