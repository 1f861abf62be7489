// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded timers (§4.3): `next_hour`, and the table-declared per-state
//! timers (`immediate_state`, `immediate_release`). Starting a timer
//! implicitly cancels any prior instance under the same name; whether a
//! timer ends by cancellation or by firing, its slot converges back to
//! empty — nothing ever leaks a background task.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{Datelike, Timelike};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The trigger name the `next_hour` timer fires (§4.1's `next_hour`,
/// distinct from the `{name}_timeout` triggers the table-declared timers
/// produce).
pub const NEXT_HOUR_TRIGGER: &str = "next_hour";

/// Suffix appended to a table-declared timer's name to get its trigger.
pub fn timeout_trigger(timer_name: &str) -> String {
    format!("{timer_name}_timeout")
}

/// Manages one background task per active timer slot. Slots are keyed by
/// timer name (`"next_hour"` included), so starting the same name twice
/// cancels the first instance rather than running both.
pub struct TimerManager {
    durations: HashMap<String, Duration>,
    slots: Mutex<HashMap<String, CancellationToken>>,
    trigger_tx: mpsc::Sender<String>,
}

impl TimerManager {
    pub fn new(durations: HashMap<String, Duration>, trigger_tx: mpsc::Sender<String>) -> Self {
        Self { durations, slots: Mutex::new(HashMap::new()), trigger_tx }
    }

    /// Start (or restart) the table-declared timer `name`. Returns
    /// `false` if `name` wasn't declared in `timers.csv`.
    pub fn start(&self, name: &str) -> bool {
        let Some(duration) = self.durations.get(name).copied() else {
            return false;
        };
        self.spawn_slot(name.to_owned(), duration, timeout_trigger(name));
        true
    }

    /// Cancel the timer `name` if one is running. A no-op if it isn't.
    pub fn stop(&self, name: &str) {
        self.cancel_slot(name);
    }

    /// Start the hour-boundary timer. Uses a two-phase sleep — coarse to
    /// within two seconds of the deadline, then fine to within 300ms of
    /// it — so a coarse tokio sleep's drift never causes the handover to
    /// land on the wrong side of the hour.
    pub fn start_next_hour(&self) {
        let deadline_seconds = seconds_until_next_hour();
        self.spawn_two_phase_slot(NEXT_HOUR_TRIGGER.to_owned(), deadline_seconds, NEXT_HOUR_TRIGGER.to_owned());
    }

    pub fn stop_next_hour(&self) {
        self.cancel_slot(NEXT_HOUR_TRIGGER);
    }

    /// Every timer name this manager knows: the table-declared ones plus
    /// the built-in hour-boundary timer. A state implies timer `τ` iff `τ`
    /// appears as a substring of the state's name (§3), so this is the
    /// full set the dispatcher needs to check a state name against.
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.durations.keys().map(String::as_str).chain(std::iter::once(NEXT_HOUR_TRIGGER))
    }

    fn spawn_slot(&self, name: String, duration: Duration, trigger: String) {
        let token = self.replace_slot(&name);
        let tx = self.trigger_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    let _ = tx.send(trigger).await;
                }
            }
        });
    }

    fn spawn_two_phase_slot(&self, name: String, total_seconds: f64, trigger: String) {
        let token = self.replace_slot(&name);
        let tx = self.trigger_tx.clone();
        tokio::spawn(async move {
            let coarse = Duration::from_secs_f64((total_seconds - 2.0).max(0.0));
            let fine = Duration::from_secs_f64(1.7);
            let remainder = Duration::from_secs_f64(0.3);

            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(coarse) => {}
            }
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(fine) => {}
            }
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(remainder) => {
                    let _ = tx.send(trigger).await;
                }
            }
        });
    }

    fn replace_slot(&self, name: &str) -> CancellationToken {
        let token = CancellationToken::new();
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slots.insert(name.to_owned(), token.clone()) {
            previous.cancel();
        }
        token
    }

    fn cancel_slot(&self, name: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = slots.remove(name) {
            token.cancel();
        }
    }

    /// Cancel every running timer. Called on shutdown.
    pub fn stop_all(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        for (_, token) in slots.drain() {
            token.cancel();
        }
    }
}

/// Seconds remaining until the top of the next hour, local time.
fn seconds_until_next_hour() -> f64 {
    let now = chrono::Local::now();
    let next_hour = (now + chrono::Duration::hours(1))
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    (next_hour - now).num_milliseconds().max(0) as f64 / 1000.0
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
