// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher itself: the single mutator task that owns the machine,
//! the role slots, and the timers, and drives the before → on-exit →
//! on-enter → after → finalize hook sequence around every transition
//! (§4.1–§4.6). Everything else in this crate is a collaborator it calls
//! into.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::TransitionRejected;
use crate::lamp::{LampState, LampStateTarget, TriColorLampColor, TriColorLampState};
use crate::lamp_projector::{resolve_role_lamp_state, LampProjector};
use crate::machine::Machine;
use crate::observer::{DispatcherEvent, Observer};
use crate::persistence::PersistenceStore;
use crate::role_binder::{RoleBinder, RoleSlots};
use crate::selector::{SelectorConvergenceLoop, SelectorController};
use crate::studio::{ButtonEvent, StudioId, StudioRegistry};
use crate::timers::TimerManager;

/// A read-only picture of where the dispatcher currently stands. Cloned
/// out to whoever asks (status endpoint, tests) — never mutated in place.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub state: String,
    pub x: Option<String>,
    pub y: Option<String>,
    pub lamp_target: LampStateTarget,
}

/// Cheap, cloneable handle external collaborators get: submit button
/// events, subscribe to events, read status, request shutdown. Never
/// touches the machine directly — everything goes through the queue.
#[derive(Clone)]
pub struct DispatcherHandle {
    role_binder: RoleBinder,
    observer: Observer,
    status: Arc<Mutex<StatusSnapshot>>,
    cancel: CancellationToken,
}

impl DispatcherHandle {
    pub async fn press(&self, studio: StudioId, button: crate::studio::Button) -> Result<(), mpsc::error::SendError<ButtonEvent>> {
        self.role_binder.press(studio, button).await
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DispatcherEvent> {
        self.observer.subscribe()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Whether `state_name` belongs to the "automat on air" family (§3:
/// OnAirSelectorValue equals the Automat's selector value in this family,
/// `selector_of(X)` otherwise). Every canonical automat-family state name
/// contains the literal token `automat_on_air` (`automat_on_air` itself,
/// its immediate-state variant, and the pending changeover *into* a
/// studio); no studio-family state name does.
fn is_automat_family(state_name: &str) -> bool {
    state_name.contains("automat_on_air")
}

/// Owns the machine and drives it. `S` is the selector backend; swapped
/// for a fake in tests and the demo binary, a real UDP client in
/// production (out of scope here).
pub struct Dispatcher<S: SelectorController> {
    registry: Arc<StudioRegistry>,
    machine: Machine,
    role_slots: RoleSlots,
    timers: TimerManager,
    role_rx: mpsc::Receiver<ButtonEvent>,
    timer_rx: mpsc::Receiver<String>,
    selector_loop: Arc<SelectorConvergenceLoop<S>>,
    lamp_projector: Arc<LampProjector>,
    persistence: PersistenceStore,
    observer: Observer,
    status: Arc<Mutex<StatusSnapshot>>,
    cancel: CancellationToken,
}

impl<S: SelectorController> Dispatcher<S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: StudioRegistry,
        machine: Machine,
        initial_slots: RoleSlots,
        timer_durations: std::collections::HashMap<String, std::time::Duration>,
        selector_controller: Arc<S>,
        lamp_projector: LampProjector,
        persistence: PersistenceStore,
        role_queue_capacity: usize,
        event_channel_capacity: usize,
    ) -> (Self, DispatcherHandle) {
        let registry = Arc::new(registry);
        let (role_binder, role_rx) = RoleBinder::new(role_queue_capacity);
        let (timer_tx, timer_rx) = mpsc::channel(16);
        let timers = TimerManager::new(timer_durations, timer_tx);
        let observer = Observer::new(event_channel_capacity);
        let cancel = CancellationToken::new();

        let lamp_target = *machine.lamp_target(machine.current());
        let status = Arc::new(Mutex::new(StatusSnapshot {
            state: machine.state_name(machine.current()).to_owned(),
            x: initial_slots.x.map(|id| registry.studio(id).name().to_owned()),
            y: initial_slots.y.map(|id| registry.studio(id).name().to_owned()),
            lamp_target,
        }));

        let handle = DispatcherHandle {
            role_binder,
            observer: observer.clone(),
            status: status.clone(),
            cancel: cancel.clone(),
        };

        let dispatcher = Dispatcher {
            registry,
            machine,
            role_slots: initial_slots,
            timers,
            role_rx,
            timer_rx,
            selector_loop: Arc::new(SelectorConvergenceLoop::new(selector_controller, observer.clone())),
            lamp_projector: Arc::new(lamp_projector),
            persistence,
            observer,
            status,
            cancel,
        };

        (dispatcher, handle)
    }

    /// Restore a persisted snapshot, if one exists, overwriting the
    /// initial state and role slots the machine was compiled with.
    pub fn restore_snapshot(&mut self) {
        match self.persistence.load(&self.registry) {
            Ok(Some(snapshot)) => {
                if let Some(state_id) = self.machine.state_id(&snapshot.state) {
                    self.machine.restore(state_id);
                    self.role_slots = RoleSlots::new(snapshot.x, snapshot.y);
                    tracing::info!(state = %snapshot.state, "restored persisted dispatcher state");
                } else {
                    tracing::warn!(state = %snapshot.state, "persisted state unknown to compiled machine, ignoring");
                }
            }
            Ok(None) => tracing::info!("no persisted state found, starting fresh"),
            Err(e) => tracing::warn!(error = %e, "failed to load persisted state, starting fresh"),
        }
    }

    /// Run the single mutator loop until shutdown is requested. Also
    /// drives the restart-on-entry next_hour timer for the initial state
    /// and kicks off the selector/lamp background reassertion loops.
    pub async fn run(mut self) {
        let initial_name = self.machine.state_name(self.machine.current()).to_owned();
        self.sync_timers("", &initial_name);
        self.finalize();

        let selector_loop = self.selector_loop.clone();
        let selector_cancel = self.cancel.clone();
        let current_selector_value = {
            let registry_automat = self.registry.automat_id();
            let x = self.role_slots.x;
            let automat_value = self.registry.selector_value_of(registry_automat);
            let resolved = x.map(|id| self.registry.selector_value_of(id)).unwrap_or(automat_value);
            std::sync::Arc::new(std::sync::atomic::AtomicI32::new(resolved))
        };
        {
            let current_selector_value = current_selector_value.clone();
            tokio::spawn(async move {
                selector_loop
                    .run(move || current_selector_value.load(std::sync::atomic::Ordering::Relaxed), selector_cancel)
                    .await;
            });
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("dispatcher shutting down");
                    self.timers.stop_all();
                    return;
                }
                Some(event) = self.role_rx.recv() => {
                    self.handle_button_event(event, &current_selector_value).await;
                }
                Some(trigger_name) = self.timer_rx.recv() => {
                    self.handle_trigger(&trigger_name, None, &current_selector_value).await;
                }
            }
        }
    }

    async fn handle_button_event(
        &mut self,
        event: ButtonEvent,
        current_selector_value: &Arc<std::sync::atomic::AtomicI32>,
    ) {
        let trigger_name = self.role_slots.trigger_name(event);
        self.handle_trigger(&trigger_name, Some(event.studio), current_selector_value).await;
    }

    async fn handle_trigger(
        &mut self,
        trigger_name: &str,
        incoming_studio: Option<StudioId>,
        current_selector_value: &Arc<std::sync::atomic::AtomicI32>,
    ) {
        let Some(trigger_id) = self.machine.trigger_id(trigger_name) else {
            self.reject(trigger_name, incoming_studio);
            return;
        };
        if !self.machine.can_fire(trigger_id) {
            self.reject(trigger_name, incoming_studio);
            return;
        }

        // before: bind a newly-arriving studio into a free role slot
        // ahead of the transition, so the destination state's X/Y already
        // reflects it.
        if let Some(studio) = incoming_studio {
            self.role_slots.bind_incoming(studio);
            self.trace_role_slots("bind_incoming");
        }

        let previous_state_name = self.machine.state_name(self.machine.current()).to_owned();
        let outcome = match self.machine.fire(trigger_id) {
            Ok(outcome) => outcome,
            Err(rejected) => {
                self.reject_rejected(rejected, incoming_studio);
                return;
            }
        };
        let next_state_name = self.machine.state_name(outcome.next).to_owned();

        if outcome.switch_xy {
            self.role_slots.apply_switch();
            self.trace_role_slots("apply_switch");
        }

        // after: a role slot whose token the destination name no longer
        // carries is cleared (§3, §4.1).
        self.clear_stale_role_slots(&next_state_name);

        self.sync_timers(&previous_state_name, &next_state_name);

        self.observer.publish(DispatcherEvent::Transitioned {
            previous_state: previous_state_name,
            next_state: next_state_name.clone(),
            x: self.role_slots.x,
            y: self.role_slots.y,
        });

        self.update_selector_target(current_selector_value, &next_state_name);
        self.selector_loop.push(current_selector_value.load(std::sync::atomic::Ordering::Relaxed)).await;

        self.finalize();
    }

    /// Clear whichever of X/Y the destination state name no longer names
    /// (§3 invariant: `"X" ∈ name ⇔ X ≠ ∅`, same for Y).
    fn clear_stale_role_slots(&mut self, dest_name: &str) {
        if !dest_name.contains('X') {
            self.role_slots.x = None;
        }
        if !dest_name.contains('Y') {
            self.role_slots.y = None;
        }
        self.trace_role_slots("clear_stale_role_slots");
    }

    /// Start every timer implied by `dest_name` but not by `source_name`,
    /// and stop every timer implied by `source_name` but not by
    /// `dest_name` — a timer implied by both keeps running, its deadline
    /// untouched (§4.3, P4).
    fn sync_timers(&self, source_name: &str, dest_name: &str) {
        for timer in self.timers.declared_names() {
            let was_active = source_name.contains(timer);
            let now_active = dest_name.contains(timer);
            if now_active && !was_active {
                self.start_timer(timer);
            } else if was_active && !now_active {
                self.stop_timer(timer);
            }
        }
    }

    fn start_timer(&self, name: &str) {
        if name == crate::timers::NEXT_HOUR_TRIGGER {
            self.timers.start_next_hour();
        } else {
            self.timers.start(name);
        }
    }

    fn stop_timer(&self, name: &str) {
        if name == crate::timers::NEXT_HOUR_TRIGGER {
            self.timers.stop_next_hour();
        } else {
            self.timers.stop(name);
        }
    }

    fn update_selector_target(&self, current_selector_value: &Arc<std::sync::atomic::AtomicI32>, dest_name: &str) {
        let automat_value = self.registry.selector_value_of(self.registry.automat_id());
        let value = if is_automat_family(dest_name) {
            automat_value
        } else {
            self.role_slots.x.map(|id| self.registry.selector_value_of(id)).unwrap_or(automat_value)
        };
        current_selector_value.store(value, std::sync::atomic::Ordering::Relaxed);
        #[cfg(feature = "audit-trace")]
        tracing::trace!(selector_value = value, "selector target written");
    }

    /// Traces every write to the X/Y role slots, opt-in via the
    /// `audit-trace` feature (a compile-time equivalent of toggling
    /// verbose internal-state logging at runtime).
    #[cfg(feature = "audit-trace")]
    fn trace_role_slots(&self, op: &'static str) {
        tracing::trace!(op, x = ?self.role_slots.x, y = ?self.role_slots.y, "role slots written");
    }

    #[cfg(not(feature = "audit-trace"))]
    fn trace_role_slots(&self, _op: &'static str) {}

    /// finalize: project lamps and persist. Runs after every settled
    /// transition and once at startup.
    fn finalize(&self) {
        let state = self.machine.current();
        let state_name = self.machine.state_name(state).to_owned();
        let lamp_target = *self.machine.lamp_target(state);

        self.lamp_projector.project(&self.registry, &lamp_target, self.role_slots.x, self.role_slots.y, &state_name);

        if let Err(e) = self.persistence.save(&self.registry, self.role_slots.x, self.role_slots.y, &state_name) {
            tracing::error!(error = %e, "failed to persist dispatcher state");
        }

        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = StatusSnapshot {
            state: state_name,
            x: self.role_slots.x.map(|id| self.registry.studio(id).name().to_owned()),
            y: self.role_slots.y.map(|id| self.registry.studio(id).name().to_owned()),
            lamp_target,
        };
    }

    fn reject(&self, trigger_name: &str, incoming_studio: Option<StudioId>) {
        let state = self.machine.state_name(self.machine.current()).to_owned();
        tracing::info!(trigger = trigger_name, state = %state, "trigger rejected: no such trigger");
        self.observer.publish(DispatcherEvent::TransitionRejected { trigger: trigger_name.to_owned(), state });
        self.flash_reject_lamp(incoming_studio);
    }

    fn reject_rejected(&self, rejected: TransitionRejected, incoming_studio: Option<StudioId>) {
        tracing::info!(trigger = %rejected.trigger, state = %rejected.state, "trigger rejected");
        self.observer.publish(DispatcherEvent::TransitionRejected { trigger: rejected.trigger, state: rejected.state });
        self.flash_reject_lamp(incoming_studio);
    }

    /// §4.2: a rejected button press briefly flashes the originating
    /// studio's immediate lamp RED at `BLINK_REALLY_FAST` for one second,
    /// then restores it from the lamp target of the state current at the
    /// moment of rejection. Runs in the background so a rejected press
    /// never stalls the mutator loop.
    fn flash_reject_lamp(&self, studio: Option<StudioId>) {
        let Some(studio) = studio else { return };
        let Some(sink) = self.lamp_projector.sink_for(studio) else { return };

        let target = self.machine.lamp_target(self.machine.current());
        let restore = resolve_role_lamp_state(&self.registry, studio, target, self.role_slots.x, self.role_slots.y).immediate;

        sink.set_immediate(TriColorLampState::new(LampState::BlinkReallyFast, TriColorLampColor::Red));
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            sink.set_immediate(restore);
        });
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
