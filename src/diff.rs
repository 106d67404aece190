use crate::core::SyncAction;

/// The value persisted under `ANKI_NOTE_HASH` at the last confirmed sync:
/// the content fingerprint, plus a short digest of the deck/model pair it was
/// sent to. Encoded as `<hash>.<target>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredState {
    pub hash: String,
    pub target: Option<String>,
}

impl StoredState {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((hash, target)) => {
                Self { hash: hash.to_string(), target: Some(target.to_string()) }
            }
            None => Self { hash: raw.to_string(), target: None },
        }
    }

    pub fn encode(hash: &str, target: &str) -> String {
        format!("{}.{}", hash, target)
    }
}

#[derive(Debug)]
pub struct DiffInput<'a> {
    pub remote_id: Option<u64>,
    /// Parsed `ANKI_NOTE_HASH` property, if the entry has one.
    pub stored: Option<StoredState>,
    pub fresh_hash: &'a str,
    pub fresh_target: &'a str,
    pub force: bool,
}

/// Change-detection verdict for one entry. Delete-scoped traversals never
/// come through here; the engine marks those directly.
///
/// An entry without a persisted hash (or with a legacy hash lacking the
/// deck/model digest) is always treated as dirty: "no prior record" is
/// indistinguishable from "prior record was empty", and a missed change is
/// worse than a redundant update. A deck or note-type move alone also counts
/// as dirty even though the content fingerprint ignores both.
pub fn decide(input: &DiffInput) -> SyncAction {
    if input.remote_id.is_none() {
        return SyncAction::Create;
    }
    if input.force {
        return SyncAction::Update;
    }
    match &input.stored {
        None => SyncAction::Update,
        Some(stored) => {
            if stored.hash != input.fresh_hash {
                SyncAction::Update
            } else if stored.target.as_deref() != Some(input.fresh_target) {
                SyncAction::Update
            } else {
                SyncAction::Skip
            }
        }
    }
}
