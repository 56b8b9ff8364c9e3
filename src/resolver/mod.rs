//! Variant Resolution Engine.
//!
//! Computes the enabled/disabled state of a component's variants for an
//! optional flavor context and mutates that state in response to user
//! toggles. A [`VariantResolver`] is an explicit session object: it borrows
//! the session's catalog snapshot and owns the mutable preference map, so
//! there is no hidden cross-call state and fixture catalogs drop straight in
//! for tests.
//!
//! # Soft-miss policy
//!
//! Unknown component, variant or flavor names never raise. Every lookup
//! degrades to "not enabled" / empty list. The UI must keep working when
//! catalog and preference data drift (a variant was deleted but a stale
//! preference entry still references it); callers performing data integrity
//! checks must validate names themselves.
//!
//! # Persistence
//!
//! Strictly in-memory. The collaborator loads the raw preference payload at
//! session start ([`VariantResolver::load_preferences`]) and flushes
//! [`VariantResolver::export_preferences`] at session end; nothing is
//! persisted mid-session.


use crate::catalog::{Catalog, Component};
use crate::preferences::{PreferenceKey, VariantPreferences};
use tracing::debug;

/// Session-scoped variant resolution state over a catalog snapshot.
#[derive(Debug)]
pub struct VariantResolver<'c> {
    catalog: &'c Catalog,
    prefs: VariantPreferences,
}

impl<'c> VariantResolver<'c> {
    /// Creates a resolver with an empty preference map.
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            prefs: VariantPreferences::new(),
        }
    }

    /// Creates a resolver over an already loaded preference map.
    pub fn with_preferences(catalog: &'c Catalog, prefs: VariantPreferences) -> Self {
        Self { catalog, prefs }
    }

    /// Preference key for a component in an optional flavor context.
    ///
    /// `None` when the component (or a non-empty flavor name) is unknown;
    /// the callers turn that into their soft-miss result.
    fn preference_key(&self, component: &str, flavor: &str) -> Option<PreferenceKey> {
        let component = self.catalog.component_by_name(component)?;
        if flavor.is_empty() {
            Some(PreferenceKey::Component(component.id))
        } else {
            let flavor = self.catalog.flavor_by_name(flavor)?;
            Some(PreferenceKey::ComponentFlavor(component.id, flavor.id))
        }
    }

    /// Whether a variant is currently enabled for a component, in an
    /// optional flavor context (`flavor = ""` for flavor-less components).
    ///
    /// Unknown names resolve to `false`, never an error.
    pub fn is_variant_enabled(&self, component: &str, variant: &str, flavor: &str) -> bool {
        let Some(key) = self.preference_key(component, flavor) else {
            return false;
        };
        let Some(variant) = self.catalog.variant_by_name(variant) else {
            return false;
        };
        self.prefs.contains(key, variant.id)
    }

    /// CSS classes of all variants currently enabled for the key, in toggle
    /// order (the order the user enabled them, not catalog order).
    ///
    /// Preference entries whose variant no longer exists are skipped.
    pub fn enabled_variant_classes(&self, component: &str, flavor: &str) -> Vec<String> {
        let Some(key) = self.preference_key(component, flavor) else {
            return Vec::new();
        };
        self.prefs
            .enabled(key)
            .iter()
            .filter_map(|id| self.catalog.variant_by_id(*id))
            .map(|variant| variant.css_class())
            .collect()
    }

    /// Concatenated `content` HTML of all variants currently enabled for the
    /// key, in the same toggle order as the classes.
    pub fn enabled_variants_html(&self, component: &str, flavor: &str) -> String {
        let Some(key) = self.preference_key(component, flavor) else {
            return String::new();
        };
        self.prefs
            .enabled(key)
            .iter()
            .filter_map(|id| self.catalog.variant_by_id(*id))
            .map(|variant| variant.content.as_str())
            .collect()
    }

    /// Enables a variant for the key. Idempotent; unknown names are a no-op.
    pub fn enable_variant(&mut self, component: &str, variant: &str, flavor: &str) {
        let (Some(key), Some(variant)) = (
            self.preference_key(component, flavor),
            self.catalog.variant_by_name(variant),
        ) else {
            return;
        };
        debug!(%key, variant = variant.id, "enable variant");
        self.prefs.enable(key, variant.id);
    }

    /// Disables a variant for the key, pruning the key when its list
    /// empties. Idempotent; unknown names are a no-op.
    pub fn disable_variant(&mut self, component: &str, variant: &str, flavor: &str) {
        let (Some(key), Some(variant)) = (
            self.preference_key(component, flavor),
            self.catalog.variant_by_name(variant),
        ) else {
            return;
        };
        debug!(%key, variant = variant.id, "disable variant");
        self.prefs.disable(key, variant.id);
    }

    /// Replaces the whole preference map from its raw JSON payload.
    ///
    /// An unparseable payload resets the map to empty (the session must
    /// start even when the stored payload is damaged).
    pub fn load_preferences(&mut self, raw: Option<&str>) {
        match raw {
            Some(raw) => {
                if let Err(err) = self.prefs.load_raw(raw) {
                    debug!(%err, "stored variant preferences unreadable, starting empty");
                    self.prefs = VariantPreferences::new();
                }
            }
            None => self.prefs = VariantPreferences::new(),
        }
    }

    /// Serializes the preference map for persistence at session end.
    pub fn export_preferences(&self) -> String {
        self.prefs.export_raw()
    }

    /// Read access to the underlying preference map.
    pub fn preferences(&self) -> &VariantPreferences {
        &self.prefs
    }

    /// The flavor name effectively active for a component: the selected one
    /// if the component has flavors at all, otherwise the empty string.
    ///
    /// A component with an empty `flavors` list never has an active flavor
    /// regardless of the UI selection.
    pub fn active_flavor<'a>(&self, component: &Component, selected: &'a str) -> &'a str {
        if component.flavors.is_empty() { "" } else { selected }
    }
}
