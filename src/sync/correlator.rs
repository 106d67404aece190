use std::{
    collections::HashMap,
    sync::{
        mpsc,
        Arc,
    },
    thread,
};

use serde_json::Value;
use tracing::{
    debug,
    warn,
};

use super::builder::{
    AnchorSlot,
    BatchOperation,
    OperationKind,
};
use crate::{
    core::BridgeError,
    transport::Transport,
};

/// Handle for one dispatched call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(pub u64);

/// Registry entry for a live call: the operation kind and the original
/// anchor sequence, in payload order. Created at dispatch, removed exactly
/// once on the first completion signal.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub kind: OperationKind,
    pub anchors: Vec<AnchorSlot>,
}

struct CallCompletion {
    id: CallId,
    outcome: Result<Value, BridgeError>,
}

/// Owns the in-flight table and the completion channel. Dispatch never
/// blocks: the transport call runs on a worker thread and delivers its
/// outcome through the channel, to be drained later on the caller's thread.
/// Completions across calls arrive in arbitrary order; two overlapping sync
/// passes are just independent table entries.
pub struct Correlator {
    transport: Arc<dyn Transport>,
    in_flight: HashMap<CallId, InFlight>,
    sender: mpsc::Sender<CallCompletion>,
    receiver: mpsc::Receiver<CallCompletion>,
    next_id: u64,
}

impl Correlator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { transport, in_flight: HashMap::new(), sender, receiver, next_id: 0 }
    }

    /// Registers the call and returns immediately. No retries: a transport
    /// failure comes back as the call's single terminal completion.
    pub fn dispatch(&mut self, op: BatchOperation) -> CallId {
        let id = CallId(self.next_id);
        self.next_id += 1;

        debug!(call = id.0, action = op.request.action, "dispatching remote call");
        self.in_flight.insert(id, InFlight { kind: op.kind, anchors: op.anchors });

        let body = op.request.body();
        let transport = self.transport.clone();
        let sender = self.sender.clone();
        thread::spawn(move || {
            let outcome = transport.call(&body);
            // A closed channel means the correlator is gone; nothing left to
            // deliver to.
            let _ = sender.send(CallCompletion { id, outcome });
        });

        id
    }

    /// Drains every completion that has arrived, without blocking. Each
    /// in-flight entry is consumed exactly once.
    pub fn poll_completions(&mut self) -> Vec<(InFlight, Result<Value, BridgeError>)> {
        let mut done = Vec::new();
        while let Ok(completion) = self.receiver.try_recv() {
            self.take(completion, &mut done);
        }
        done
    }

    /// Blocks for the next completion. Returns `None` when nothing is in
    /// flight.
    pub fn wait_completion(&mut self) -> Option<(InFlight, Result<Value, BridgeError>)> {
        while !self.in_flight.is_empty() {
            let completion = self.receiver.recv().ok()?;
            let mut done = Vec::new();
            self.take(completion, &mut done);
            if let Some(pair) = done.pop() {
                return Some(pair);
            }
        }
        None
    }

    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    fn take(
        &mut self,
        completion: CallCompletion,
        done: &mut Vec<(InFlight, Result<Value, BridgeError>)>,
    ) {
        match self.in_flight.remove(&completion.id) {
            Some(entry) => {
                debug!(call = completion.id.0, ok = completion.outcome.is_ok(), "call completed");
                done.push((entry, completion.outcome));
            }
            None => warn!(call = completion.id.0, "completion for unknown call"),
        }
    }
}
