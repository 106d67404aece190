use crate::{
    anki::{
        requests,
        Request,
    },
    core::{
        Anchor,
        NoteDraft,
        SyncAction,
    },
    diff::StoredState,
    fingerprint::target_digest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Query { browse: bool },
}

/// One position inside a batch payload. `anchors[i]` of a [`BatchOperation`]
/// corresponds to the i-th sub-item of its request; that positional pairing
/// is the only mechanism correlating asynchronous results back to entries.
#[derive(Debug, Clone)]
pub struct AnchorSlot {
    pub anchor: Anchor,
    /// Value to persist under `ANKI_NOTE_HASH` when this position succeeds.
    /// `None` for operations that clear state or mutate nothing.
    pub stored: Option<String>,
}

/// One remote call ready to dispatch.
#[derive(Debug, Clone)]
pub struct BatchOperation {
    pub kind: OperationKind,
    pub request: Request,
    pub anchors: Vec<AnchorSlot>,
}

/// Serializes a decided set into the fewest remote calls: one `addNotes` for
/// every create, one `multi` of `updateNote` sub-actions for every update
/// (so the store can still report per-note outcomes), one `deleteNotes` for
/// every delete. Drafts are read, never mutated; `Skip` entries never appear
/// here.
pub fn build_batches(
    decided: &[(SyncAction, NoteDraft)],
    allow_duplicate: bool,
) -> Vec<BatchOperation> {
    let mut create_notes = Vec::new();
    let mut create_anchors = Vec::new();
    let mut update_actions = Vec::new();
    let mut update_anchors = Vec::new();
    let mut delete_ids = Vec::new();
    let mut delete_anchors = Vec::new();

    for (action, draft) in decided {
        match action {
            SyncAction::Skip => {}
            SyncAction::Create => {
                create_notes.push(requests::note_params(draft, allow_duplicate));
                create_anchors.push(slot(draft));
            }
            SyncAction::Update => {
                // The diff engine only yields Update for entries with an id.
                let Some(id) = draft.remote_id else { continue };
                update_actions.push(requests::update_note(draft, id));
                update_anchors.push(slot(draft));
            }
            SyncAction::Delete => {
                let Some(id) = draft.remote_id else { continue };
                delete_ids.push(id);
                delete_anchors.push(AnchorSlot { anchor: draft.anchor, stored: None });
            }
        }
    }

    let mut batches = Vec::new();
    if !create_notes.is_empty() {
        batches.push(BatchOperation {
            kind: OperationKind::Create,
            request: requests::add_notes(create_notes),
            anchors: create_anchors,
        });
    }
    if !update_actions.is_empty() {
        batches.push(BatchOperation {
            kind: OperationKind::Update,
            request: requests::multi(update_actions),
            anchors: update_anchors,
        });
    }
    if !delete_ids.is_empty() {
        batches.push(BatchOperation {
            kind: OperationKind::Delete,
            request: requests::delete_notes(&delete_ids),
            anchors: delete_anchors,
        });
    }
    batches
}

fn slot(draft: &NoteDraft) -> AnchorSlot {
    AnchorSlot {
        anchor: draft.anchor,
        stored: Some(StoredState::encode(
            &draft.content_hash,
            &target_digest(&draft.deck, &draft.model),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn draft(anchor: u64, remote_id: Option<u64>, front: &str) -> NoteDraft {
        let fields = vec![("Front".to_string(), front.to_string())];
        let tags = BTreeSet::new();
        let content_hash = crate::fingerprint::fingerprint(&fields, &tags);
        NoteDraft {
            remote_id,
            fields,
            tags,
            deck: "Default".to_string(),
            model: "Basic".to_string(),
            anchor: Anchor(anchor),
            content_hash,
        }
    }

    #[test]
    fn one_batch_per_kind_in_payload_order() {
        let decided = vec![
            (SyncAction::Create, draft(1, None, "a")),
            (SyncAction::Update, draft(2, Some(20), "b")),
            (SyncAction::Skip, draft(3, Some(30), "c")),
            (SyncAction::Create, draft(4, None, "d")),
            (SyncAction::Delete, draft(5, Some(50), "e")),
        ];

        let batches = build_batches(&decided, false);
        assert_eq!(batches.len(), 3);

        assert_eq!(batches[0].kind, OperationKind::Create);
        assert_eq!(batches[0].request.action, "addNotes");
        let anchors: Vec<Anchor> = batches[0].anchors.iter().map(|s| s.anchor).collect();
        assert_eq!(anchors, vec![Anchor(1), Anchor(4)]);
        let notes = &batches[0].request.params.as_ref().unwrap()["notes"];
        assert_eq!(notes.as_array().unwrap().len(), 2);

        assert_eq!(batches[1].kind, OperationKind::Update);
        assert_eq!(batches[1].request.action, "multi");
        assert_eq!(batches[1].anchors.len(), 1);
        assert!(batches[1].anchors[0].stored.is_some());

        assert_eq!(batches[2].kind, OperationKind::Delete);
        assert_eq!(
            batches[2].request.params.as_ref().unwrap()["notes"],
            serde_json::json!([50])
        );
        assert!(batches[2].anchors[0].stored.is_none());
    }

    #[test]
    fn all_skips_build_nothing() {
        let decided = vec![(SyncAction::Skip, draft(1, Some(10), "a"))];
        assert!(build_batches(&decided, false).is_empty());
    }
}
