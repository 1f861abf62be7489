// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! X/Y role binding and the button-event queue (§4.2). Button sources are
//! external collaborators; this module only defines the bounded queue
//! they push into and the pure role-slot bookkeeping the dispatcher's
//! "before" hook consults to turn a `(button, studio)` pair into a
//! trigger name.

use tokio::sync::mpsc;

use crate::studio::{Button, ButtonEvent, StudioId};

/// The current X/Y binding. `other` is implicit: any studio that is
/// neither `x` nor `y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSlots {
    pub x: Option<StudioId>,
    pub y: Option<StudioId>,
}

impl RoleSlots {
    pub fn new(x: Option<StudioId>, y: Option<StudioId>) -> Self {
        Self { x, y }
    }

    /// §4.2 rule table: X slot empty or already holding `studio` yields
    /// `_X`; otherwise a Y slot empty or already holding `studio` yields
    /// `_Y`; otherwise `_other`.
    fn suffix_for(&self, studio: StudioId) -> &'static str {
        if self.x.is_none() || self.x == Some(studio) {
            "X"
        } else if self.y.is_none() || self.y == Some(studio) {
            "Y"
        } else {
            "other"
        }
    }

    /// The trigger name a button press produces given the current
    /// binding — `"{button}_X"`, `"{button}_Y"`, or `"{button}_other"`.
    pub fn trigger_name(&self, event: ButtonEvent) -> String {
        format!("{}_{}", event.button.stem(), self.suffix_for(event.studio))
    }

    /// Claim a role slot for `studio` if it doesn't already hold one,
    /// preferring X. Called before firing a takeover from a studio that
    /// is currently neither X nor Y (§4.2: "a takeover from a new studio
    /// claims whichever slot is empty").
    pub fn bind_incoming(&mut self, studio: StudioId) {
        if self.x == Some(studio) || self.y == Some(studio) {
            return;
        }
        if self.x.is_none() {
            self.x = Some(studio);
        } else if self.y.is_none() {
            self.y = Some(studio);
        }
    }

    /// Applied when a transition's `switch_xy` column is set: `X ← Y; Y ←
    /// ∅` (§4.1). Not a true swap — whatever studio was in X before is
    /// dropped, since by the time `switch_xy` fires the old X has already
    /// relinquished air (it is Y that is moving up to take over).
    pub fn apply_switch(&mut self) {
        self.x = self.y;
        self.y = None;
    }

    /// Release `studio` from whichever slot it holds, if any.
    pub fn release(&mut self, studio: StudioId) {
        if self.x == Some(studio) {
            self.x = None;
        }
        if self.y == Some(studio) {
            self.y = None;
        }
    }
}

/// Producer-facing handle to the button-event queue. Capacity 1: a second
/// button press blocks until the dispatcher's single mutator loop has
/// drained the first, serializing every state change (§4.2: "button
/// events are processed one at a time, in the order received").
#[derive(Debug, Clone)]
pub struct RoleBinder {
    tx: mpsc::Sender<ButtonEvent>,
}

impl RoleBinder {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ButtonEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue a button event, waiting for room if the queue is full.
    pub async fn submit(&self, event: ButtonEvent) -> Result<(), mpsc::error::SendError<ButtonEvent>> {
        self.tx.send(event).await
    }

    pub fn press(&self, studio: StudioId, button: Button) -> impl std::future::Future<Output = Result<(), mpsc::error::SendError<ButtonEvent>>> + '_ {
        self.submit(ButtonEvent { studio, button })
    }
}

#[cfg(test)]
#[path = "role_binder_tests.rs"]
mod tests;
