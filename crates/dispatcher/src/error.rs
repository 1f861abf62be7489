// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy (§7): configuration errors are fatal at startup, the
//! rest are recoverable and logged at the severity named below.

use std::fmt;

/// Fatal at startup: duplicate names, selector-value collisions, loader
/// assertion failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    EmptyStudioName,
    DuplicateStudioName { name: String },
    DuplicateSelectorValue { selector_value: i32 },
    StudioNamedAutomat { name: String },
    SelectorValueOutOfRange { selector_value: i32, position_count: i32 },
    DuplicateStateName { name: String },
    DuplicateLampStateTarget { state_a: String, state_b: String },
    TimerNameSubstring { timer_a: String, timer_b: String },
    UnknownTrigger { trigger: String },
    DuplicateTransition { trigger: String, source: String },
    UnknownState { name: String },
    TableRead { table: &'static str, message: String },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStudioName => write!(f, "studio name must not be empty"),
            Self::DuplicateStudioName { name } => write!(f, "duplicate studio name: {name}"),
            Self::DuplicateSelectorValue { selector_value } => {
                write!(f, "selector value already assigned: {selector_value}")
            }
            Self::StudioNamedAutomat { name } => {
                write!(f, "studio has the magic automat name: {name}")
            }
            Self::SelectorValueOutOfRange { selector_value, position_count } => write!(
                f,
                "selector value {selector_value} out of range [1, {position_count}]"
            ),
            Self::DuplicateStateName { name } => write!(f, "duplicate state name: {name}"),
            Self::DuplicateLampStateTarget { state_a, state_b } => write!(
                f,
                "states {state_a} and {state_b} produce identical lamp targets"
            ),
            Self::TimerNameSubstring { timer_a, timer_b } => {
                write!(f, "timer name {timer_a} is a substring of {timer_b}")
            }
            Self::UnknownTrigger { trigger } => write!(f, "unknown trigger: {trigger}"),
            Self::DuplicateTransition { trigger, source } => {
                write!(f, "duplicate (trigger, source) pair: ({trigger}, {source})")
            }
            Self::UnknownState { name } => write!(f, "transition references unknown state: {name}"),
            Self::TableRead { table, message } => write!(f, "failed to read {table} table: {message}"),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// A trigger had no matching transition from the current state.
/// Recoverable: logged at INFO, surfaced via the one-second red flash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRejected {
    pub trigger: String,
    pub state: String,
}

impl fmt::Display for TransitionRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger {} rejected in state {}", self.trigger, self.state)
    }
}

impl std::error::Error for TransitionRejected {}

/// `set_position` timed out or the DSP returned NAK. Recoverable: the
/// convergence loop retries on its own schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorIoError {
    Nak { selector_value: i32 },
    Timeout { selector_value: i32 },
}

impl fmt::Display for SelectorIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nak { selector_value } => write!(f, "selector NAK for position {selector_value}"),
            Self::Timeout { selector_value } => {
                write!(f, "selector timeout for position {selector_value}")
            }
        }
    }
}

impl std::error::Error for SelectorIoError {}

/// Load fails → initial state used; save fails → logged, shutdown continues.
#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Decode(serde_json::Error),
    UnknownStudio { name: String },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "persistence I/O error: {e}"),
            Self::Decode(e) => write!(f, "persistence decode error: {e}"),
            Self::UnknownStudio { name } => write!(f, "persisted studio unknown: {name}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::UnknownStudio { .. } => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}
