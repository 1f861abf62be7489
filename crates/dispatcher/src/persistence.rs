// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence (§4.6): the dispatcher's entire durable state is
//! the current state name plus the X/Y role bindings. Written atomically
//! via write-to-temp-then-rename so a crash mid-write never corrupts the
//! on-disk snapshot.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::studio::{StudioId, StudioRegistry};

/// On-disk shape. Studios are persisted by name, not by [`StudioId`],
/// since ids are only stable within one process's registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedDispatcherState {
    x: Option<String>,
    y: Option<String>,
    state: String,
}

/// A snapshot ready to restore a [`crate::machine::Machine`] and role
/// slots from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub x: Option<StudioId>,
    pub y: Option<StudioId>,
    pub state: String,
}

/// Reads and writes dispatcher snapshots at a fixed path.
pub struct PersistenceStore {
    path: PathBuf,
}

impl PersistenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the last-saved snapshot, resolving studio names against
    /// `registry`. A missing file is not an error — callers fall back to
    /// the initial state (§4.6: "Load fails → initial state used").
    pub fn load(&self, registry: &StudioRegistry) -> Result<Option<Snapshot>, PersistenceError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let persisted: PersistedDispatcherState = serde_json::from_slice(&bytes)?;

        let resolve = |name: &Option<String>| -> Result<Option<StudioId>, PersistenceError> {
            match name {
                None => Ok(None),
                Some(name) => registry
                    .by_name(name)
                    .map(Some)
                    .ok_or_else(|| PersistenceError::UnknownStudio { name: name.clone() }),
            }
        };

        Ok(Some(Snapshot {
            x: resolve(&persisted.x)?,
            y: resolve(&persisted.y)?,
            state: persisted.state,
        }))
    }

    /// Write a snapshot atomically: serialize to a sibling `.tmp` file,
    /// then rename over the real path so a crash mid-write never leaves a
    /// half-written snapshot behind.
    pub fn save(
        &self,
        registry: &StudioRegistry,
        x: Option<StudioId>,
        y: Option<StudioId>,
        state: &str,
    ) -> Result<(), PersistenceError> {
        let persisted = PersistedDispatcherState {
            x: x.map(|id| registry.studio(id).name().to_owned()),
            y: y.map(|id| registry.studio(id).name().to_owned()),
            state: state.to_owned(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;

        let tmp_path = tmp_path_for(&self.path);
        std::fs::write(&tmp_path, &bytes)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(".tmp");
    PathBuf::from(os_string)
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
