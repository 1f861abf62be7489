// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative table loader (§6, §9 "Declarative transition tables"):
//! reads `timers.csv`, `states.csv`, and `transitions.csv` and yields a
//! validated set of rows ready for [`crate::machine::Machine::compile`].
//!
//! Kept table-driven on purpose, as the design notes call for: the lamp
//! projection contract stays auditable as plain rows instead of code.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::lamp::{LampStateTarget, StudioLampState, TriColorLampColor, TriColorLampState};

/// One row of `timers.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimerRow {
    pub name: String,
    pub timeout_seconds: f64,
}

/// One row of `transitions.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRow {
    pub trigger: String,
    pub source: String,
    pub dest: String,
    pub switch_xy: bool,
}

/// A fully parsed state row, ready to be interned by the machine compiler.
#[derive(Debug, Clone)]
pub struct StateRow {
    pub name: String,
    pub lamp_target: LampStateTarget,
}

/// Raw CSV columns for `states.csv`, matched 1:1 against the header row.
#[derive(Debug, Clone, Deserialize)]
struct RawStateRow {
    name: String,
    automat_main_state: String,
    automat_main_color: String,
    x_main_state: String,
    x_main_color: String,
    x_immediate_state: String,
    x_immediate_color: String,
    y_main_state: String,
    y_main_color: String,
    y_immediate_state: String,
    y_immediate_color: String,
    other_main_state: String,
    other_main_color: String,
    other_immediate_state: String,
    other_immediate_color: String,
}

fn parse_lamp_state(field: &str, column: &'static str) -> Result<crate::lamp::LampState, ConfigurationError> {
    use crate::lamp::LampState::*;
    match field.to_uppercase().as_str() {
        "OFF" => Ok(Off),
        "ON" => Ok(On),
        "BLINK" => Ok(Blink),
        "BLINK_FAST" => Ok(BlinkFast),
        "BLINK_REALLY_FAST" => Ok(BlinkReallyFast),
        other => Err(ConfigurationError::TableRead {
            table: "states",
            message: format!("unknown lamp state {other:?} in column {column}"),
        }),
    }
}

fn parse_lamp_color(field: &str, column: &'static str) -> Result<TriColorLampColor, ConfigurationError> {
    use TriColorLampColor::*;
    match field.to_uppercase().as_str() {
        "NONE" => Ok(None),
        "GREEN" => Ok(Green),
        "RED" => Ok(Red),
        "YELLOW" => Ok(Yellow),
        other => Err(ConfigurationError::TableRead {
            table: "states",
            message: format!("unknown lamp color {other:?} in column {column}"),
        }),
    }
}

impl RawStateRow {
    fn into_state_row(self) -> Result<StateRow, ConfigurationError> {
        let automat_main = TriColorLampState::new(
            parse_lamp_state(&self.automat_main_state, "automat_main_state")?,
            parse_lamp_color(&self.automat_main_color, "automat_main_color")?,
        );
        let x = StudioLampState {
            main: TriColorLampState::new(
                parse_lamp_state(&self.x_main_state, "x_main_state")?,
                parse_lamp_color(&self.x_main_color, "x_main_color")?,
            ),
            immediate: TriColorLampState::new(
                parse_lamp_state(&self.x_immediate_state, "x_immediate_state")?,
                parse_lamp_color(&self.x_immediate_color, "x_immediate_color")?,
            ),
        };
        let y = StudioLampState {
            main: TriColorLampState::new(
                parse_lamp_state(&self.y_main_state, "y_main_state")?,
                parse_lamp_color(&self.y_main_color, "y_main_color")?,
            ),
            immediate: TriColorLampState::new(
                parse_lamp_state(&self.y_immediate_state, "y_immediate_state")?,
                parse_lamp_color(&self.y_immediate_color, "y_immediate_color")?,
            ),
        };
        let other = StudioLampState {
            main: TriColorLampState::new(
                parse_lamp_state(&self.other_main_state, "other_main_state")?,
                parse_lamp_color(&self.other_main_color, "other_main_color")?,
            ),
            immediate: TriColorLampState::new(
                parse_lamp_state(&self.other_immediate_state, "other_immediate_state")?,
                parse_lamp_color(&self.other_immediate_color, "other_immediate_color")?,
            ),
        };

        let mut lamp_target = LampStateTarget { automat: StudioLampState { main: automat_main, immediate: TriColorLampState::off() }, x, y, other };

        // A state whose name doesn't mention X (or Y) has no binding for
        // that role; zero its lamp target rather than trusting the row.
        if !self.name.contains('X') {
            lamp_target.x = StudioLampState::default();
        }
        if !self.name.contains('Y') {
            lamp_target.y = StudioLampState::default();
        }

        Ok(StateRow { name: self.name, lamp_target })
    }
}

/// Load and validate `timers.csv`. Asserts no timer name is a substring of
/// another (§3: "No timer name may be a substring of another timer name").
pub fn load_timers(path: &Path) -> Result<Vec<TimerRow>, ConfigurationError> {
    let rows = read_csv::<TimerRow>(path, "timers")?;
    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            let (a, b) = (&rows[i].name, &rows[j].name);
            if a.contains(b.as_str()) || b.contains(a.as_str()) {
                return Err(ConfigurationError::TimerNameSubstring {
                    timer_a: a.clone(),
                    timer_b: b.clone(),
                });
            }
        }
    }
    Ok(rows)
}

/// Load and validate `states.csv`. Asserts unique (case-insensitive) names
/// and distinct lamp targets (the `immediate` channel is ignored for the
/// uniqueness check, producing a warning rather than a hard error).
pub fn load_states(path: &Path) -> Result<Vec<StateRow>, ConfigurationError> {
    let raw = read_csv::<RawStateRow>(path, "states")?;
    let mut seen_lower = HashSet::new();
    let mut states = Vec::with_capacity(raw.len());
    for row in raw {
        let lower = row.name.to_lowercase();
        if !seen_lower.insert(lower) {
            return Err(ConfigurationError::DuplicateStateName { name: row.name });
        }
        states.push(row.into_state_row()?);
    }

    for i in 0..states.len() {
        for j in (i + 1)..states.len() {
            if states[i].lamp_target == states[j].lamp_target {
                return Err(ConfigurationError::DuplicateLampStateTarget {
                    state_a: states[i].name.clone(),
                    state_b: states[j].name.clone(),
                });
            }
        }
    }
    warn_on_duplicate_ignoring_immediate(&states);

    Ok(states)
}

fn warn_on_duplicate_ignoring_immediate(states: &[StateRow]) {
    for i in 0..states.len() {
        for j in (i + 1)..states.len() {
            if states[i].lamp_target.ignoring_immediate() == states[j].lamp_target.ignoring_immediate() {
                tracing::warn!(
                    state_a = %states[i].name,
                    state_b = %states[j].name,
                    "duplicate lamp state ignoring immediate channel"
                );
            }
        }
    }
}

/// Load and validate `transitions.csv` against the declared trigger
/// vocabulary (§4.1) and state names already loaded from `states.csv`.
pub fn load_transitions(
    path: &Path,
    state_names: &HashSet<String>,
    timer_names: &[String],
) -> Result<Vec<TransitionRow>, ConfigurationError> {
    let rows = read_csv::<TransitionRow>(path, "transitions")?;

    let mut vocabulary: HashSet<String> = HashSet::new();
    vocabulary.insert("next_hour".to_owned());
    for button in ["takeover", "release", "immediate"] {
        for suffix in ["X", "Y", "other"] {
            vocabulary.insert(format!("{button}_{suffix}"));
        }
    }
    for timer in timer_names {
        vocabulary.insert(format!("{timer}_timeout"));
    }

    let mut seen_pairs = HashSet::new();
    for row in &rows {
        if !vocabulary.contains(&row.trigger) {
            return Err(ConfigurationError::UnknownTrigger { trigger: row.trigger.clone() });
        }
        if !state_names.contains(&row.source) {
            return Err(ConfigurationError::UnknownState { name: row.source.clone() });
        }
        if !state_names.contains(&row.dest) {
            return Err(ConfigurationError::UnknownState { name: row.dest.clone() });
        }
        if !seen_pairs.insert((row.trigger.clone(), row.source.clone())) {
            return Err(ConfigurationError::DuplicateTransition {
                trigger: row.trigger.clone(),
                source: row.source.clone(),
            });
        }
    }

    Ok(rows)
}

fn read_csv<T: for<'de> Deserialize<'de>>(
    path: &Path,
    table: &'static str,
) -> Result<Vec<T>, ConfigurationError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ConfigurationError::TableRead {
        table,
        message: e.to_string(),
    })?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|e| ConfigurationError::TableRead { table, message: e.to_string() })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "tables_tests.rs"]
mod tests;
