//! Entity record types for the elements catalog.
//!
//! Categories group components; components are HTML templates parameterized
//! by flavors (theme variants, selectable per category) and variants
//! (toggleable sub-features). The two join types connect components to
//! flavors and variants by name rather than id, because names are the stable
//! natural keys that survive export/import round trips.
//!
//! All entities are plain data with `serde` derives. Names are validated at
//! construction: they must look like identifiers (start with a letter or
//! underscore, then letters, digits, `-`, `_`), since they end up in CSS
//! class names and data attributes.

use crate::core::{ElementsError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Opaque entity id. Allocated per catalog, meaningless across sessions.
pub type EntityId = u64;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("static pattern compiles"));

/// Validates an entity name against the identifier pattern.
///
/// # Errors
///
/// Returns [`ElementsError::InvalidName`] if the name is empty or contains
/// characters outside letters, digits, `-` and `_`, or starts with a digit
/// or `-`.
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(ElementsError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

/// A top-level grouping of insertable components, with its own style bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Catalog-allocated id (0 = not yet inserted).
    #[serde(default)]
    pub id: EntityId,
    /// Stable unique key.
    pub name: String,
    /// Human-readable name shown in the picker.
    #[serde(default)]
    pub displayname: String,
    /// Sort position; lowest value is the default selection.
    #[serde(default)]
    pub displayorder: i32,
    /// Category-level stylesheet fragment. May contain asset references.
    #[serde(default)]
    pub css: String,
}

impl Category {
    /// Creates a category with a validated name.
    pub fn new(name: impl Into<String>, displayname: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name("category", &name)?;
        Ok(Self {
            name,
            displayname: displayname.into(),
            ..Self::default()
        })
    }
}

/// A reusable HTML template insertable into a document.
///
/// `code` is the template carrying the placeholder tokens consumed by
/// [`crate::compose`]. The `flavors` and `variants` lists are denormalized
/// name lists; the authoritative relations are the join rows, but the lists
/// travel with the component through export/import so join rows can be
/// recreated for newly inserted components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Catalog-allocated id (0 = not yet inserted).
    #[serde(default)]
    pub id: EntityId,
    /// Stable unique key.
    pub name: String,
    /// Human-readable name shown on the component button.
    #[serde(default)]
    pub displayname: String,
    /// Id of the owning category.
    #[serde(default)]
    pub category: EntityId,
    /// Name of the owning category (denormalized).
    #[serde(default)]
    pub categoryname: String,
    /// HTML template with placeholder tokens.
    #[serde(default)]
    pub code: String,
    /// Default placeholder text used when the user has no selection.
    #[serde(default)]
    pub text: String,
    /// Names of variants available for this component.
    #[serde(default)]
    pub variants: Vec<String>,
    /// Names of flavors available for this component.
    #[serde(default)]
    pub flavors: Vec<String>,
    /// Sort position within the category.
    #[serde(default)]
    pub displayorder: i32,
    /// Component-level stylesheet fragment.
    #[serde(default)]
    pub css: String,
    /// Component-level script fragment.
    #[serde(default)]
    pub js: String,
    /// Icon for the component button. May contain asset references.
    #[serde(default)]
    pub iconurl: String,
    /// Hide this component from student users.
    #[serde(default)]
    pub hideforstudents: bool,
}

impl Component {
    /// Creates a component with a validated name.
    pub fn new(name: impl Into<String>, displayname: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name("component", &name)?;
        Ok(Self {
            name,
            displayname: displayname.into(),
            ..Self::default()
        })
    }
}

/// A category-scoped visual theme selectable per insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    /// Catalog-allocated id (0 = not yet inserted).
    #[serde(default)]
    pub id: EntityId,
    /// Stable unique key.
    pub name: String,
    /// Human-readable name shown on the flavor button.
    #[serde(default)]
    pub displayname: String,
    /// Sort position.
    #[serde(default)]
    pub displayorder: i32,
    /// HTML fragment describing the flavor.
    #[serde(default)]
    pub content: String,
    /// Flavor-level stylesheet fragment.
    #[serde(default)]
    pub css: String,
    /// Name of the category whose components use this flavor (derived;
    /// may be empty in legacy data and is backfilled on import).
    #[serde(default)]
    pub categoryname: String,
    /// Hide this flavor from student users.
    #[serde(default)]
    pub hideforstudents: bool,
}

impl Flavor {
    /// Creates a flavor with a validated name.
    pub fn new(name: impl Into<String>, displayname: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name("flavor", &name)?;
        Ok(Self {
            name,
            displayname: displayname.into(),
            ..Self::default()
        })
    }
}

/// A toggleable sub-feature of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Catalog-allocated id (0 = not yet inserted).
    #[serde(default)]
    pub id: EntityId,
    /// Stable unique key.
    pub name: String,
    /// Human-readable name shown on the variant toggle.
    #[serde(default)]
    pub displayname: String,
    /// HTML fragment injected into the template when the variant is enabled.
    #[serde(default)]
    pub content: String,
    /// Variant-level stylesheet fragment.
    #[serde(default)]
    pub css: String,
    /// Icon for the variant toggle. May contain asset references.
    #[serde(default)]
    pub iconurl: String,
    /// Use the legacy `c4l-` class prefix instead of `elements-`.
    #[serde(default)]
    pub c4lcompatibility: bool,
    /// Name of the category whose components use this variant (derived).
    #[serde(default)]
    pub categoryname: String,
}

impl Variant {
    /// Creates a variant with a validated name.
    pub fn new(name: impl Into<String>, displayname: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name("variant", &name)?;
        Ok(Self {
            name,
            displayname: displayname.into(),
            ..Self::default()
        })
    }

    /// CSS class this variant contributes when enabled.
    pub fn css_class(&self) -> String {
        let prefix = if self.c4lcompatibility { "c4l" } else { "elements" };
        format!("{prefix}-{}-variant", self.name)
    }
}

/// Join row connecting a component to a flavor, keyed by their names.
///
/// `iconurl` optionally overrides the component button icon for this pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFlavor {
    /// Catalog-allocated id (0 = not yet inserted).
    #[serde(default)]
    pub id: EntityId,
    /// Component name (natural key half).
    pub componentname: String,
    /// Flavor name (natural key half).
    pub flavorname: String,
    /// Per-pairing icon override. May contain asset references.
    #[serde(default)]
    pub iconurl: String,
}

/// Join row connecting a component to a variant, keyed by their names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVariant {
    /// Catalog-allocated id (0 = not yet inserted).
    #[serde(default)]
    pub id: EntityId,
    /// Component name (natural key half).
    pub componentname: String,
    /// Variant name (natural key half).
    pub variant: String,
}
