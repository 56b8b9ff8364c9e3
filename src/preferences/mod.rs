//! Per-user preference state for the editor session.
//!
//! Three values are persisted per user at session boundaries (the external
//! store owns the actual persistence; this module owns the JSON shapes):
//!
//! - the enabled-variant map ([`VariantPreferences`])
//! - the last-used category and last-used flavor per category
//!   ([`SessionPrefs`])
//!
//! # Preference keys
//!
//! Enabled-variant state is tracked per component, or per
//! (component, flavor) pair for flavor-bearing components. The key is a
//! proper sum type ([`PreferenceKey`]); its serialized form is the legacy
//! string shape (`"12"` / `"12-34"`) so exported payloads stay compatible
//! with previously stored ones.
//!
//! # Pruning
//!
//! A key exists only while its list of enabled variant ids is non-empty.
//! Readers must treat "key absent" and "key empty" identically; the map
//! prunes eagerly so the serialized payload stays small.

#[cfg(test)]
mod preferences_tests;

use crate::catalog::EntityId;
use crate::core::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Preference name under which the enabled-variant map is persisted.
pub const PREF_COMPONENT_VARIANTS: &str = "elements_component_variants";
/// Preference name under which the last-used category id is persisted.
pub const PREF_CATEGORY: &str = "elements_category";
/// Preference name under which the per-category flavor map is persisted.
pub const PREF_CATEGORY_FLAVORS: &str = "elements_category_flavors";

/// Identity under which enabled-variant state is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    /// A component without flavors.
    Component(EntityId),
    /// A flavor-bearing component paired with one of its flavors.
    ComponentFlavor(EntityId, EntityId),
}

impl PreferenceKey {
    /// Parses the legacy string form: `"12"` or `"12-34"`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.split_once('-') {
            Some((component, flavor)) => Some(Self::ComponentFlavor(
                component.parse().ok()?,
                flavor.parse().ok()?,
            )),
            None => Some(Self::Component(raw.parse().ok()?)),
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(component) => write!(f, "{component}"),
            Self::ComponentFlavor(component, flavor) => write!(f, "{component}-{flavor}"),
        }
    }
}

/// Ordered map of preference key → enabled variant ids.
///
/// Both the keys and the id lists preserve insertion order: the list order is
/// the order the user toggled the variants on, which drives the order of the
/// generated CSS classes and injected variant HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantPreferences {
    entries: Vec<(PreferenceKey, Vec<EntityId>)>,
}

impl VariantPreferences {
    /// Creates an empty preference map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enabled variant ids for a key, in toggle order. Empty for absent keys.
    pub fn enabled(&self, key: PreferenceKey) -> &[EntityId] {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a variant id is enabled under a key.
    pub fn contains(&self, key: PreferenceKey, variant: EntityId) -> bool {
        self.enabled(key).contains(&variant)
    }

    /// Appends a variant id under a key, creating the key lazily.
    /// Idempotent: an already enabled id is left where it is.
    pub fn enable(&mut self, key: PreferenceKey, variant: EntityId) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, ids)) => {
                if !ids.contains(&variant) {
                    ids.push(variant);
                }
            }
            None => self.entries.push((key, vec![variant])),
        }
    }

    /// Removes a variant id from a key, pruning the key when it empties.
    /// Idempotent: a missing id is a no-op.
    pub fn disable(&mut self, key: PreferenceKey, variant: EntityId) {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            let ids = &mut self.entries[pos].1;
            ids.retain(|id| *id != variant);
            if ids.is_empty() {
                self.entries.remove(pos);
            }
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the whole map from a raw JSON payload
    /// (`{"12": [3, 4], "12-7": [3]}`). Never merges.
    ///
    /// Unparseable keys or list entries are skipped; the map still loads.
    /// Ids may arrive as JSON numbers or strings (older payloads stored
    /// strings).
    ///
    /// # Errors
    ///
    /// Returns a JSON error only when the payload itself is not a JSON
    /// object.
    pub fn load_raw(&mut self, raw: &str) -> Result<()> {
        let value: Value = serde_json::from_str(raw)?;
        let object = value.as_object().cloned().unwrap_or_default();
        self.entries.clear();
        for (raw_key, raw_ids) in &object {
            let Some(key) = PreferenceKey::parse(raw_key) else {
                tracing::debug!(key = %raw_key, "skipping unparseable preference key");
                continue;
            };
            let ids: Vec<EntityId> = raw_ids
                .as_array()
                .map(|list| list.iter().filter_map(entity_id_value).collect())
                .unwrap_or_default();
            if !ids.is_empty() {
                self.entries.push((key, ids));
            }
        }
        Ok(())
    }

    /// Serializes the map back to its raw JSON payload. Pruned keys are
    /// absent, not empty.
    pub fn export_raw(&self) -> String {
        let mut object = Map::new();
        for (key, ids) in &self.entries {
            object.insert(
                key.to_string(),
                Value::Array(ids.iter().map(|id| Value::from(*id)).collect()),
            );
        }
        Value::Object(object).to_string()
    }
}

fn entity_id_value(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// The remaining per-user session state: last-used category and the
/// last-used flavor for each category, restored when the picker reopens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPrefs {
    /// Category selected when the picker was last closed.
    pub last_category: Option<EntityId>,
    last_flavor: HashMap<EntityId, EntityId>,
}

impl SessionPrefs {
    /// Creates empty session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-used flavor for a category, if any.
    pub fn last_flavor(&self, category: EntityId) -> Option<EntityId> {
        self.last_flavor.get(&category).copied()
    }

    /// Records the flavor last selected within a category.
    pub fn remember_flavor(&mut self, category: EntityId, flavor: EntityId) {
        self.last_flavor.insert(category, flavor);
    }

    /// Replaces the per-category flavor map from its raw JSON payload
    /// (`{"2": 7, "5": 9}`).
    ///
    /// # Errors
    ///
    /// Returns a JSON error when the payload is not a JSON object.
    pub fn load_flavors_raw(&mut self, raw: &str) -> Result<()> {
        let value: Value = serde_json::from_str(raw)?;
        let object = value.as_object().cloned().unwrap_or_default();
        self.last_flavor.clear();
        for (raw_category, raw_flavor) in &object {
            let (Ok(category), Some(flavor)) =
                (raw_category.parse::<EntityId>(), entity_id_value(raw_flavor))
            else {
                continue;
            };
            self.last_flavor.insert(category, flavor);
        }
        Ok(())
    }

    /// Serializes the per-category flavor map to its raw JSON payload.
    pub fn export_flavors_raw(&self) -> String {
        let mut object = Map::new();
        for (category, flavor) in &self.last_flavor {
            object.insert(category.to_string(), Value::from(*flavor));
        }
        Value::Object(object).to_string()
    }
}
