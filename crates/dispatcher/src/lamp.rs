// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lamp descriptors and the per-state lamp-target projection shape (§4.5).
//!
//! The lamp sink itself (blink pacing, GPIO/SPI output) is out of scope —
//! this module only defines the wire-shape the dispatcher hands to it.

use serde::{Deserialize, Serialize};

/// Blink state of a single lamp channel. The lamp sink translates these
/// into physical blink frequencies: ON has no frequency, BLINK is 2 Hz,
/// BLINK_FAST is 6 Hz, BLINK_REALLY_FAST is 10 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LampState {
    #[default]
    Off,
    On,
    Blink,
    BlinkFast,
    BlinkReallyFast,
}

impl LampState {
    /// Blink frequency in Hz, or `None` for states that don't blink.
    pub fn frequency_hz(&self) -> Option<f64> {
        match self {
            LampState::Off | LampState::On => None,
            LampState::Blink => Some(2.0),
            LampState::BlinkFast => Some(6.0),
            LampState::BlinkReallyFast => Some(10.0),
        }
    }
}

/// Color of a tri-color lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriColorLampColor {
    #[default]
    None,
    Green,
    Red,
    Yellow,
}

/// A single tri-color lamp's target: blink pattern plus color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TriColorLampState {
    pub state: LampState,
    pub color: TriColorLampColor,
}

impl TriColorLampState {
    pub const fn new(state: LampState, color: TriColorLampColor) -> Self {
        Self { state, color }
    }

    pub fn off() -> Self {
        Self::default()
    }
}

/// Both lamp channels a normal studio has. The automat only uses `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StudioLampState {
    pub main: TriColorLampState,
    pub immediate: TriColorLampState,
}

/// Per-role lamp targets a state projects onto every studio (§4.5): the
/// automat, the studio bound to X, the studio bound to Y, and everyone
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LampStateTarget {
    pub automat: StudioLampState,
    pub x: StudioLampState,
    pub y: StudioLampState,
    pub other: StudioLampState,
}

impl LampStateTarget {
    /// A target equal to `self` but with the `immediate` channel of every
    /// role zeroed out, used to compare states modulo the immediate lamp
    /// (§3: "the loader asserts this, ignoring the immediate channel only
    /// with a warning").
    pub fn ignoring_immediate(&self) -> Self {
        let strip = |s: StudioLampState| StudioLampState { main: s.main, immediate: TriColorLampState::off() };
        LampStateTarget {
            automat: strip(self.automat),
            x: strip(self.x),
            y: strip(self.y),
            other: strip(self.other),
        }
    }
}

/// External collaborator: realizes a lamp descriptor physically. Out of
/// scope per §1 (GPIO/SPI backends); the dispatcher only ever talks to
/// this trait.
pub trait LampSink: Send + Sync {
    fn set_main(&self, state: TriColorLampState);
    fn set_immediate(&self, state: TriColorLampState);
}

#[cfg(test)]
#[path = "lamp_tests.rs"]
mod tests;
