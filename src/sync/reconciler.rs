use serde_json::Value;
use tracing::debug;

use super::{
    builder::OperationKind,
    correlator::InFlight,
};
use crate::{
    anki::{
        requests,
        ApiResponse,
        Request,
    },
    core::{
        BridgeError,
        SyncReport,
    },
    document::{
        DocumentHost,
        MetaKey,
    },
};

/// Applies one completed call back to the document. The only writer of
/// `ANKI_NOTE_ID`/`ANKI_NOTE_HASH`, and it writes only here, after the
/// remote store confirmed the call.
///
/// Partial failures are per-position: a `null` id inside an `addNotes`
/// result or an errored sub-action inside a `multi` result is reported and
/// leaves that anchor's persisted state alone, while its siblings are
/// processed normally. A transport failure or a remote-level `error` skips
/// reconciliation entirely and only produces a report.
///
/// The second return value is a follow-up request the caller should
/// dispatch (currently only the browse step after a query).
pub fn reconcile(
    host: &mut dyn DocumentHost,
    in_flight: &InFlight,
    outcome: Result<Value, BridgeError>,
) -> (SyncReport, Option<Request>) {
    let mut report = SyncReport::default();

    let result = match outcome.and_then(|raw| ApiResponse::parse(raw)?.into_result()) {
        Ok(result) => result,
        Err(e) => {
            report.failed = in_flight.anchors.len().max(1);
            report.details.push(format!("remote call failed: {}", e));
            return (report, None);
        }
    };

    match in_flight.kind {
        OperationKind::Create => reconcile_create(host, in_flight, result, &mut report),
        OperationKind::Update => reconcile_update(host, in_flight, result, &mut report),
        OperationKind::Delete => reconcile_delete(host, in_flight, &mut report),
        OperationKind::Query { browse } => {
            let follow_up = reconcile_query(result, browse, &mut report);
            return (report, follow_up);
        }
    }
    debug!(summary = %report.summary(), "reconciled remote call");
    (report, None)
}

fn reconcile_create(
    host: &mut dyn DocumentHost,
    in_flight: &InFlight,
    result: Option<Value>,
    report: &mut SyncReport,
) {
    let ids = result_array(result);
    for (position, slot) in in_flight.anchors.iter().enumerate() {
        match ids.get(position).and_then(Value::as_u64) {
            Some(id) => {
                host.set_property(slot.anchor, MetaKey::NoteId, &id.to_string());
                if let Some(stored) = &slot.stored {
                    host.set_property(slot.anchor, MetaKey::NoteHash, stored);
                }
                report.succeeded += 1;
            }
            // A null at this position means the store rejected just this
            // note; its persisted state stays untouched.
            None => report.failure(format!("{}: remote store rejected note", slot.anchor)),
        }
    }
}

fn reconcile_update(
    host: &mut dyn DocumentHost,
    in_flight: &InFlight,
    result: Option<Value>,
    report: &mut SyncReport,
) {
    let sub_results = result_array(result);
    for (position, slot) in in_flight.anchors.iter().enumerate() {
        // A position with no sub-result is unconfirmed, and unconfirmed
        // means failed: persisting the hash anyway would mark a dirty entry
        // clean and the next pass would skip the lost edit.
        let Some(sub_result) = sub_results.get(position) else {
            report.failure(format!("{}: no result for update", slot.anchor));
            continue;
        };
        match sub_error(sub_result) {
            Some(error) => report.failure(format!("{}: {}", slot.anchor, error)),
            None => {
                // Refresh the hash only; the remote id does not change on
                // update.
                if let Some(stored) = &slot.stored {
                    host.set_property(slot.anchor, MetaKey::NoteHash, stored);
                }
                report.succeeded += 1;
            }
        }
    }
}

fn reconcile_delete(host: &mut dyn DocumentHost, in_flight: &InFlight, report: &mut SyncReport) {
    for slot in &in_flight.anchors {
        host.clear_property(slot.anchor, MetaKey::NoteId);
        host.clear_property(slot.anchor, MetaKey::NoteHash);
        report.succeeded += 1;
    }
}

fn reconcile_query(
    result: Option<Value>,
    browse: bool,
    report: &mut SyncReport,
) -> Option<Request> {
    report.succeeded += 1;
    // Liveness probes and remote-sync triggers return scalars; only id
    // lists are worth echoing or browsing.
    let Some(Value::Array(items)) = result else {
        return None;
    };
    let ids: Vec<u64> = items.iter().filter_map(Value::as_u64).collect();
    report.details.push(format!("query matched {} notes", ids.len()));
    if browse && !ids.is_empty() {
        let joined =
            ids.iter().map(u64::to_string).collect::<Vec<String>>().join(",");
        return Some(requests::gui_browse(&format!("nid:{}", joined)));
    }
    None
}

fn result_array(result: Option<Value>) -> Vec<Value> {
    match result {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// A `multi` sub-result is either a bare result value or a nested
/// `{result, error}` envelope; only a non-null `error` counts as failure.
fn sub_error(sub_result: &Value) -> Option<String> {
    let error = sub_result.get("error")?;
    match error {
        Value::Null => None,
        other => Some(other.as_str().unwrap_or("sub-action failed").to_string()),
    }
}
