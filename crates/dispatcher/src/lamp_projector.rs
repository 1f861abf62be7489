// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lamp state projection (§4.5): at finalize time, and periodically
//! thereafter, the current state's [`LampStateTarget`] is pushed out to
//! every studio's lamp sink. Which physical lamp a studio's sink drives
//! (GPIO, SPI, whatever) is out of scope — this module only decides
//! *what* each studio should show.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::lamp::{LampSink, LampStateTarget, StudioLampState};
use crate::observer::{DispatcherEvent, Observer};
use crate::studio::{StudioId, StudioRegistry};

/// How often the projector re-pushes the current target even if nothing
/// changed, so a lamp controller that missed an update (power-cycled,
/// reconnected) catches back up within a bounded time.
const REASSERT_INTERVAL: Duration = Duration::from_secs(30);

/// Which role a studio plays against the current target (§4.5): the
/// automat, X, Y, or everyone else.
pub fn resolve_role_lamp_state(
    registry: &StudioRegistry,
    id: StudioId,
    target: &LampStateTarget,
    x: Option<StudioId>,
    y: Option<StudioId>,
) -> StudioLampState {
    if id == registry.automat_id() {
        target.automat
    } else if Some(id) == x {
        target.x
    } else if Some(id) == y {
        target.y
    } else {
        target.other
    }
}

/// Maps studios to their lamp sinks and pushes [`LampStateTarget`]s out.
pub struct LampProjector {
    sinks: HashMap<StudioId, Arc<dyn LampSink>>,
    observer: Observer,
}

impl LampProjector {
    pub fn new(sinks: HashMap<StudioId, Arc<dyn LampSink>>, observer: Observer) -> Self {
        Self { sinks, observer }
    }

    /// Push `target` to every studio's sink, resolving the automat/X/Y/
    /// other role for each studio from `registry` and the current
    /// binding. Studios with no registered sink are skipped silently —
    /// not every studio in the registry necessarily has lamp hardware
    /// wired up (e.g. in tests).
    pub fn project(
        &self,
        registry: &StudioRegistry,
        target: &LampStateTarget,
        x: Option<StudioId>,
        y: Option<StudioId>,
        state_name: &str,
    ) {
        for studio in registry.all_studios() {
            let id = studio.id();
            let lamp_state = resolve_role_lamp_state(registry, id, target, x, y);
            if let Some(sink) = self.sinks.get(&id) {
                sink.set_main(lamp_state.main);
                sink.set_immediate(lamp_state.immediate);
            }
        }
        self.observer.publish(DispatcherEvent::LampTargetsUpdated {
            state: state_name.to_owned(),
            target: *target,
        });
    }

    /// The lamp sink registered for `studio`, if any. Lets callers outside
    /// the normal `project` path (the reject-flash reaction, §4.2) drive a
    /// single studio's lamp directly.
    pub fn sink_for(&self, studio: StudioId) -> Option<Arc<dyn LampSink>> {
        self.sinks.get(&studio).cloned()
    }

    /// Run until `cancel` fires, re-pushing `current_target()` on a fixed
    /// interval.
    pub async fn run(
        &self,
        registry: &StudioRegistry,
        current: impl Fn() -> (LampStateTarget, Option<StudioId>, Option<StudioId>, String),
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(REASSERT_INTERVAL);
        ticker.tick().await; // first tick fires immediately; consume it
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("lamp projector shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    let (target, x, y, state_name) = current();
                    self.project(registry, &target, x, y, &state_name);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "lamp_projector_tests.rs"]
mod tests;
