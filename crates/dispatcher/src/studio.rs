// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Studio registry: the fixed set of broadcast studios plus the automat
//! (program automation) source, and the button events they emit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Opaque handle into a [`StudioRegistry`]. Cheap to copy, stable for the
/// lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StudioId(u16);

#[cfg(any(test, feature = "test-util"))]
impl StudioId {
    /// Build a bare handle for tests that only need distinct, comparable
    /// ids and don't need a full [`StudioRegistry`].
    pub fn for_test(n: u16) -> Self {
        StudioId(n)
    }
}

/// Whether a studio is the automat (program automation) source or a normal
/// broadcast studio with buttons and a selector value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioKind {
    /// The automated program source. Always available, no buttons, only a
    /// `main` lamp.
    Automat,
    /// A broadcast studio with takeover/release/immediate buttons and a
    /// main + immediate lamp pair.
    Normal,
}

/// A studio (or the automat) known to the dispatcher.
#[derive(Debug, Clone)]
pub struct Studio {
    id: StudioId,
    name: String,
    kind: StudioKind,
}

impl Studio {
    pub fn id(&self) -> StudioId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StudioKind {
        self.kind
    }

    pub fn is_automat(&self) -> bool {
        matches!(self.kind, StudioKind::Automat)
    }
}

/// A button press relevant to the dispatcher. Authentication of button
/// events is out of scope (spec non-goal) — the registry only cares that
/// the studio is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Takeover,
    Release,
    Immediate,
}

impl Button {
    /// The trigger-name stem used before the `_X` / `_Y` / `_other` suffix.
    pub fn stem(&self) -> &'static str {
        match self {
            Button::Takeover => "takeover",
            Button::Release => "release",
            Button::Immediate => "immediate",
        }
    }
}

/// A debounced button press as delivered by the (external) button source.
#[derive(Debug, Clone, Copy)]
pub struct ButtonEvent {
    pub studio: StudioId,
    pub button: Button,
}

/// Declares a studio's selector value: the DSP input position that routes
/// it to air.
#[derive(Debug, Clone)]
pub struct DispatcherStudioDefinition {
    pub name: String,
    pub selector_value: i32,
}

impl DispatcherStudioDefinition {
    pub fn new(name: impl Into<String>, selector_value: i32) -> Self {
        Self { name: name.into(), selector_value }
    }
}

/// The fixed-size registry of studios built once at startup.
///
/// Role slots (X/Y) hold [`StudioId`]s rather than references into this
/// registry, so the registry itself never needs interior mutability.
#[derive(Debug)]
pub struct StudioRegistry {
    studios: Vec<Studio>,
    selector_values: HashMap<StudioId, i32>,
    by_name: HashMap<String, StudioId>,
    by_selector: HashMap<i32, StudioId>,
    automat_id: StudioId,
}

impl StudioRegistry {
    /// Build the registry from the automat definition and the list of
    /// normal studio definitions, validating every invariant named in the
    /// data model (§3): unique non-empty names, unique selector values
    /// (including the automat's), and the automat not colliding with the
    /// magic name `"automat"`.
    pub fn new(
        automat: DispatcherStudioDefinition,
        studios: Vec<DispatcherStudioDefinition>,
    ) -> Result<Self, ConfigurationError> {
        let mut registry = StudioRegistry {
            studios: Vec::with_capacity(studios.len() + 1),
            selector_values: HashMap::new(),
            by_name: HashMap::new(),
            by_selector: HashMap::new(),
            automat_id: StudioId(0),
        };

        if automat.name.is_empty() {
            return Err(ConfigurationError::EmptyStudioName);
        }
        let automat_id = registry.insert(automat.name.clone(), StudioKind::Automat)?;
        registry.automat_id = automat_id;
        registry.bind_selector_value(automat_id, automat.selector_value)?;

        for def in studios {
            if def.name.is_empty() {
                return Err(ConfigurationError::EmptyStudioName);
            }
            if def.name == automat.name {
                return Err(ConfigurationError::StudioNamedAutomat { name: def.name });
            }
            let id = registry.insert(def.name.clone(), StudioKind::Normal)?;
            registry.bind_selector_value(id, def.selector_value)?;
        }

        Ok(registry)
    }

    fn insert(&mut self, name: String, kind: StudioKind) -> Result<StudioId, ConfigurationError> {
        if self.by_name.contains_key(&name) {
            return Err(ConfigurationError::DuplicateStudioName { name });
        }
        let id = StudioId(self.studios.len() as u16);
        self.by_name.insert(name.clone(), id);
        self.studios.push(Studio { id, name, kind });
        Ok(id)
    }

    fn bind_selector_value(
        &mut self,
        id: StudioId,
        selector_value: i32,
    ) -> Result<(), ConfigurationError> {
        if self.by_selector.contains_key(&selector_value) {
            return Err(ConfigurationError::DuplicateSelectorValue { selector_value });
        }
        self.by_selector.insert(selector_value, id);
        self.selector_values.insert(id, selector_value);
        Ok(())
    }

    /// Validate the automat's selector value falls within `[1, position_count]`,
    /// the valid range the selector controller accepts. Grounded on the
    /// original `Dispatcher.__init__`'s range check.
    pub fn validate_automat_range(&self, position_count: i32) -> Result<(), ConfigurationError> {
        let value = self.selector_values[&self.automat_id];
        if !(1..=position_count).contains(&value) {
            return Err(ConfigurationError::SelectorValueOutOfRange {
                selector_value: value,
                position_count,
            });
        }
        Ok(())
    }

    pub fn automat_id(&self) -> StudioId {
        self.automat_id
    }

    pub fn studio(&self, id: StudioId) -> &Studio {
        &self.studios[id.0 as usize]
    }

    pub fn by_name(&self, name: &str) -> Option<StudioId> {
        self.by_name.get(name).copied()
    }

    pub fn by_selector_value(&self, selector_value: i32) -> Option<StudioId> {
        self.by_selector.get(&selector_value).copied()
    }

    pub fn selector_value_of(&self, id: StudioId) -> i32 {
        self.selector_values[&id]
    }

    /// Normal studios only (excludes the automat), in registration order.
    pub fn normal_studios(&self) -> impl Iterator<Item = &Studio> {
        self.studios.iter().filter(|s| !s.is_automat())
    }

    pub fn all_studios(&self) -> impl Iterator<Item = &Studio> {
        self.studios.iter()
    }
}

#[cfg(test)]
#[path = "studio_tests.rs"]
mod tests;
