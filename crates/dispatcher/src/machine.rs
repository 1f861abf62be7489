// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The compiled state graph (§4.1, §4.3): states and triggers are interned
//! to small integer ids so a transition lookup is a binary search over a
//! handful of entries per state rather than a string comparison.
//!
//! `Machine` only knows about states, triggers, and lamp targets. The
//! before/on-exit/on-enter/after/finalize hook sequence that drives role
//! binding, timers, and lamp projection lives one layer up in
//! [`crate::dispatcher`] — this module has no opinion about what a trigger
//! *means*, only about whether it's legal from the current state.

use std::collections::HashMap;

use crate::error::{ConfigurationError, TransitionRejected};
use crate::lamp::LampStateTarget;
use crate::tables::{StateRow, TransitionRow};

/// Interned state handle. Stable for the lifetime of a compiled [`Machine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

/// Interned trigger handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(u32);

#[derive(Debug, Clone, Copy)]
struct Edge {
    trigger: TriggerId,
    dest: StateId,
    switch_xy: bool,
}

/// The result of a legal transition: which state was left, which was
/// entered, and whether the X/Y role slots should be swapped (§4.2).
#[derive(Debug, Clone, Copy)]
pub struct FireOutcome {
    pub previous: StateId,
    pub next: StateId,
    pub switch_xy: bool,
}

/// The compiled, immutable state graph plus the single mutable cursor that
/// is "the current state". Everything but `current` is fixed at compile
/// time.
#[derive(Debug)]
pub struct Machine {
    state_names: Vec<String>,
    state_by_name: HashMap<String, StateId>,
    lamp_targets: Vec<LampStateTarget>,
    trigger_names: Vec<String>,
    trigger_by_name: HashMap<String, TriggerId>,
    /// Outgoing edges per state, sorted by `trigger` for binary search.
    edges: Vec<Vec<Edge>>,
    current: StateId,
}

impl Machine {
    /// Compile validated state and transition rows into a graph, starting
    /// at `initial`.
    pub fn compile(
        states: Vec<StateRow>,
        transitions: Vec<TransitionRow>,
        initial: &str,
    ) -> Result<Self, ConfigurationError> {
        let mut state_names = Vec::with_capacity(states.len());
        let mut state_by_name = HashMap::with_capacity(states.len());
        let mut lamp_targets = Vec::with_capacity(states.len());
        for row in states {
            let id = StateId(state_names.len() as u32);
            state_by_name.insert(row.name.clone(), id);
            state_names.push(row.name);
            lamp_targets.push(row.lamp_target);
        }

        let mut trigger_names = Vec::new();
        let mut trigger_by_name: HashMap<String, TriggerId> = HashMap::new();
        let mut intern_trigger = |name: &str, trigger_names: &mut Vec<String>| -> TriggerId {
            if let Some(id) = trigger_by_name.get(name) {
                return *id;
            }
            let id = TriggerId(trigger_names.len() as u32);
            trigger_names.push(name.to_owned());
            trigger_by_name.insert(name.to_owned(), id);
            id
        };

        let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); state_names.len()];
        for row in transitions {
            let trigger = intern_trigger(&row.trigger, &mut trigger_names);
            let source = *state_by_name
                .get(&row.source)
                .ok_or_else(|| ConfigurationError::UnknownState { name: row.source.clone() })?;
            let dest = *state_by_name
                .get(&row.dest)
                .ok_or_else(|| ConfigurationError::UnknownState { name: row.dest.clone() })?;
            edges[source.0 as usize].push(Edge { trigger, dest, switch_xy: row.switch_xy });
        }
        for out in &mut edges {
            out.sort_by_key(|e| e.trigger);
        }

        let current = *state_by_name
            .get(initial)
            .ok_or_else(|| ConfigurationError::UnknownState { name: initial.to_owned() })?;

        Ok(Machine { state_names, state_by_name, lamp_targets, trigger_names, trigger_by_name, edges, current })
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_by_name.get(name).copied()
    }

    pub fn state_name(&self, id: StateId) -> &str {
        &self.state_names[id.0 as usize]
    }

    pub fn trigger_id(&self, name: &str) -> Option<TriggerId> {
        self.trigger_by_name.get(name).copied()
    }

    pub fn trigger_name(&self, id: TriggerId) -> &str {
        &self.trigger_names[id.0 as usize]
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn lamp_target(&self, state: StateId) -> &LampStateTarget {
        &self.lamp_targets[state.0 as usize]
    }

    /// Force the cursor to `state` without going through a transition.
    /// Used only to restore a persisted state at startup (§4.6) — never
    /// call this mid-run, it bypasses the hook sequence entirely.
    pub fn restore(&mut self, state: StateId) {
        self.current = state;
    }

    /// Look up the edge for `trigger` from the current state via binary
    /// search, apply it, and return what changed. Leaves `current` and
    /// returns `Err` untouched if no such edge exists (§7:
    /// `TransitionRejected`, the caller decides how loud to be about it).
    pub fn fire(&mut self, trigger: TriggerId) -> Result<FireOutcome, TransitionRejected> {
        let out = &self.edges[self.current.0 as usize];
        let edge = out
            .binary_search_by_key(&trigger, |e| e.trigger)
            .ok()
            .map(|idx| out[idx])
            .ok_or_else(|| TransitionRejected {
                trigger: self.trigger_names[trigger.0 as usize].clone(),
                state: self.state_names[self.current.0 as usize].clone(),
            })?;

        let previous = self.current;
        self.current = edge.dest;
        Ok(FireOutcome { previous, next: edge.dest, switch_xy: edge.switch_xy })
    }

    /// Whether `trigger` has any edge at all from the current state,
    /// without firing it. Used by the role binder to decide whether a
    /// button press is even worth queueing.
    pub fn can_fire(&self, trigger: TriggerId) -> bool {
        let out = &self.edges[self.current.0 as usize];
        out.binary_search_by_key(&trigger, |e| e.trigger).is_ok()
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
