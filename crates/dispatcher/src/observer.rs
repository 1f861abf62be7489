// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event fanout for observers (§5: "the HTTP/WebSocket surface ... treated
//! as an external collaborator"). This module only owns the broadcast
//! channel and the event shape; nothing downstream of it is in scope.

use tokio::sync::broadcast;

use crate::lamp::LampStateTarget;
use crate::studio::StudioId;

/// Everything an external observer needs to render the current picture,
/// emitted once per settled transition (after the finalize hook runs).
#[derive(Debug, Clone)]
pub enum DispatcherEvent {
    /// The machine moved from one state to another.
    Transitioned {
        previous_state: String,
        next_state: String,
        x: Option<StudioId>,
        y: Option<StudioId>,
    },
    /// A button press was rejected because no transition matched.
    TransitionRejected { trigger: String, state: String },
    /// The lamp projection for the current state was (re)computed.
    LampTargetsUpdated { state: String, target: LampStateTarget },
    /// The selector converged on (or failed to reach) the on-air position.
    SelectorConverged { selector_value: i32 },
    SelectorIoFailed { selector_value: i32, message: String },
}

/// Thin wrapper around a [`broadcast::Sender`]: publishing never blocks,
/// and a publish with no subscribers is not an error. Broadcasting is
/// best-effort — the dispatcher's own behavior never depends on whether
/// anyone is listening.
#[derive(Debug, Clone)]
pub struct Observer {
    tx: broadcast::Sender<DispatcherEvent>,
}

impl Observer {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Observer { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DispatcherEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: DispatcherEvent) {
        // Err means no receivers are currently subscribed; not a fault.
        let _ = self.tx.send(event);
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new(64)
    }
}
