// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for the studio dispatcher.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level CLI/env configuration. The studio roster itself lives in a
/// separate JSON file (`studios_config`) since it's a variable-length
/// list, not something that fits one flag per field.
#[derive(Debug, Clone, clap::Parser)]
pub struct DispatcherConfig {
    /// Path to the JSON file declaring the automat and studio roster.
    #[arg(long, env = "DISPATCHER_STUDIOS_CONFIG")]
    pub studios_config: PathBuf,

    /// Directory containing `timers.csv`, `states.csv`, `transitions.csv`.
    #[arg(long, default_value = "tables", env = "DISPATCHER_TABLES_DIR")]
    pub tables_dir: PathBuf,

    /// Path to the persisted dispatcher snapshot.
    #[arg(long, default_value = "dispatcher_state.json", env = "DISPATCHER_STATE_FILE")]
    pub state_file: PathBuf,

    /// Name of the state to start in if no persisted snapshot exists.
    #[arg(long, default_value = "automat_on_air", env = "DISPATCHER_INITIAL_STATE")]
    pub initial_state: String,

    /// Number of selector positions the DSP accepts, used to validate the
    /// automat's configured selector value at startup.
    #[arg(long, default_value_t = 64, env = "DISPATCHER_POSITION_COUNT")]
    pub position_count: i32,

    /// Capacity of the broadcast channel observers subscribe to.
    #[arg(long, default_value_t = 64, env = "DISPATCHER_EVENT_CHANNEL_CAPACITY")]
    pub event_channel_capacity: usize,

    /// Capacity of the button-event queue. Kept at 1 by default so button
    /// presses are strictly serialized; raising it changes that guarantee.
    #[arg(long, default_value_t = 1, env = "DISPATCHER_ROLE_QUEUE_CAPACITY")]
    pub role_queue_capacity: usize,
}

/// On-disk shape of `studios_config` (§3's data model): the automat plus
/// the roster of normal studios, each with a DSP selector value.
#[derive(Debug, Clone, Deserialize)]
pub struct StudiosConfig {
    pub automat_name: String,
    pub automat_selector_value: i32,
    pub studios: Vec<StudioConfigEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudioConfigEntry {
    pub name: String,
    pub selector_value: i32,
}

impl StudiosConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
