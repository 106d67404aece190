use std::sync::Arc;

use tracing::debug;

use super::{
    builder::{
        build_batches,
        AnchorSlot,
        BatchOperation,
        OperationKind,
    },
    correlator::{
        CallId,
        Correlator,
    },
    reconciler,
};
use crate::{
    anki::requests,
    config::SyncConfig,
    core::{
        Anchor,
        NoteDraft,
        SyncAction,
        SyncReport,
    },
    diff::{
        decide,
        DiffInput,
        StoredState,
    },
    document::{
        DocumentHost,
        MetaKey,
    },
    extract::extract,
    fingerprint::target_digest,
    render::{
        BatchRenderer,
        PlainRenderer,
        Renderer,
    },
    transport::{
        HttpTransport,
        Transport,
    },
};

/// Outcome of one pass: what went out, what failed or was skipped before
/// anything was dispatched.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub dispatched: Vec<CallId>,
    pub report: SyncReport,
}

/// Orchestrates a sync pass end to end: select entries, extract drafts,
/// diff against persisted state, batch-render the dirty ones, group them
/// into the fewest remote calls, and hand those to the correlator. The
/// calling thread returns as soon as the calls are dispatched; results are
/// folded back in through [`reconcile`](SyncEngine::reconcile).
pub struct SyncEngine {
    config: SyncConfig,
    correlator: Correlator,
    renderer: Box<dyn Renderer>,
    batcher: BatchRenderer,
}

impl SyncEngine {
    pub fn new(
        config: SyncConfig,
        transport: Arc<dyn Transport>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self { config, correlator: Correlator::new(transport), renderer, batcher: BatchRenderer::new() }
    }

    /// Engine against a live AnkiConnect endpoint, with content passed
    /// through unrendered.
    pub fn with_http(config: SyncConfig) -> Result<Self, crate::core::BridgeError> {
        let transport = Arc::new(HttpTransport::new(&config.endpoint)?);
        Ok(Self::new(config, transport, Box::new(PlainRenderer)))
    }

    /// Full create/update pass over the entries matching `match_expr` (or
    /// the document's own `ANKI_MATCH` when none is given).
    pub fn sync(
        &mut self,
        host: &mut impl DocumentHost,
        match_expr: Option<&str>,
        force: bool,
    ) -> SyncOutcome {
        self.sync_filtered(host, match_expr, force, |_| false)
    }

    /// Like [`sync`](SyncEngine::sync), with a caller-supplied exclusion
    /// predicate on top of the match expression.
    pub fn sync_filtered(
        &mut self,
        host: &mut impl DocumentHost,
        match_expr: Option<&str>,
        force: bool,
        exclude: impl Fn(Anchor) -> bool,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        let mut decided: Vec<(SyncAction, NoteDraft)> = Vec::new();
        for anchor in self.select(host, match_expr) {
            if exclude(anchor) {
                continue;
            }
            // A config error is fatal for this entry only; the pass goes on.
            let draft = match extract(host, &self.config, anchor) {
                Ok(draft) => draft,
                Err(e) => {
                    outcome.report.failure(format!("{}: {}", anchor, e));
                    continue;
                }
            };

            let fresh_target = target_digest(&draft.deck, &draft.model);
            let input = DiffInput {
                remote_id: draft.remote_id,
                stored: host
                    .property(anchor, MetaKey::NoteHash)
                    .map(|raw| StoredState::parse(&raw)),
                fresh_hash: &draft.content_hash,
                fresh_target: &fresh_target,
                force,
            };
            match decide(&input) {
                SyncAction::Skip => outcome.report.skipped += 1,
                action => decided.push((action, draft)),
            }
        }

        // Render everything that will be sent, in one collaborator call. An
        // alignment failure aborts the pass before any network traffic.
        let drafts: Vec<NoteDraft> = decided.iter().map(|(_, d)| d.clone()).collect();
        let rendered = match self.batcher.render(self.renderer.as_ref(), &drafts) {
            Ok(rendered) => rendered,
            Err(e) => {
                outcome.report.failure(format!("render batch aborted: {}", e));
                return outcome;
            }
        };
        for ((_, draft), values) in decided.iter_mut().zip(rendered) {
            for ((_, field_value), rendered_value) in draft.fields.iter_mut().zip(values) {
                *field_value = rendered_value;
            }
        }

        debug!(dirty = decided.len(), skipped = outcome.report.skipped, "sync pass decided");
        for batch in build_batches(&decided, self.config.allow_duplicate) {
            outcome.dispatched.push(self.correlator.dispatch(batch));
        }
        outcome
    }

    /// Delete-scoped traversal: every matching entry with a remote id goes
    /// into one `deleteNotes` call, independent of content hashes. Entries
    /// that were never created remotely are counted as skipped.
    pub fn delete(
        &mut self,
        host: &mut impl DocumentHost,
        match_expr: Option<&str>,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        let mut ids = Vec::new();
        let mut anchors = Vec::new();
        for anchor in self.select(host, match_expr) {
            let remote_id = host
                .property(anchor, MetaKey::NoteId)
                .and_then(|raw| raw.parse::<u64>().ok());
            match remote_id {
                Some(id) => {
                    ids.push(id);
                    anchors.push(AnchorSlot { anchor, stored: None });
                }
                None => {
                    outcome.report.skipped += 1;
                    outcome.report.details.push(format!("{}: no remote note to delete", anchor));
                }
            }
        }

        if !ids.is_empty() {
            let batch = BatchOperation {
                kind: OperationKind::Delete,
                request: requests::delete_notes(&ids),
                anchors,
            };
            outcome.dispatched.push(self.correlator.dispatch(batch));
        }
        outcome
    }

    /// Dispatches a `findNotes` query. With `browse` set, reconciliation
    /// follows up with a `guiBrowse` over the matched ids.
    pub fn find_notes(&mut self, query: &str, browse: bool) -> CallId {
        self.correlator.dispatch(BatchOperation {
            kind: OperationKind::Query { browse },
            request: requests::find_notes(query),
            anchors: Vec::new(),
        })
    }

    /// Cheap liveness probe against the remote endpoint.
    pub fn check_connection(&mut self) -> CallId {
        self.correlator.dispatch(BatchOperation {
            kind: OperationKind::Query { browse: false },
            request: requests::version(),
            anchors: Vec::new(),
        })
    }

    /// Asks the remote store to run its own collection sync.
    pub fn trigger_remote_sync(&mut self) -> CallId {
        self.correlator.dispatch(BatchOperation {
            kind: OperationKind::Query { browse: false },
            request: requests::sync(),
            anchors: Vec::new(),
        })
    }

    /// Folds every completion that has arrived back into the document and
    /// returns the merged summary. Never blocks.
    pub fn reconcile(&mut self, host: &mut impl DocumentHost) -> SyncReport {
        let mut report = SyncReport::default();
        for (in_flight, outcome) in self.correlator.poll_completions() {
            self.apply(host, &in_flight, outcome, &mut report);
        }
        report
    }

    /// Blocks until everything in flight has completed and been applied.
    pub fn reconcile_blocking(&mut self, host: &mut impl DocumentHost) -> SyncReport {
        let mut report = SyncReport::default();
        while let Some((in_flight, outcome)) = self.correlator.wait_completion() {
            self.apply(host, &in_flight, outcome, &mut report);
        }
        report
    }

    pub fn pending(&self) -> usize {
        self.correlator.pending()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn apply(
        &mut self,
        host: &mut impl DocumentHost,
        in_flight: &super::correlator::InFlight,
        outcome: Result<serde_json::Value, crate::core::BridgeError>,
        report: &mut SyncReport,
    ) {
        let (call_report, follow_up) = reconciler::reconcile(host, in_flight, outcome);
        report.merge(call_report);
        if let Some(request) = follow_up {
            self.correlator.dispatch(BatchOperation {
                kind: OperationKind::Query { browse: false },
                request,
                anchors: Vec::new(),
            });
        }
    }

    fn select(&self, host: &impl DocumentHost, match_expr: Option<&str>) -> Vec<Anchor> {
        let expr = match match_expr {
            Some(expr) => Some(expr.to_string()),
            None => host.global_property(MetaKey::Match),
        };
        host.select(expr.as_deref())
    }
}
