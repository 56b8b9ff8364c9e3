//! Template Composition Engine.
//!
//! Produces the final HTML string the editor host inserts into the document.
//! Component templates carry placeholder tokens; composition substitutes
//! them in a fixed order, so that later substitutions can never re-trigger
//! earlier patterns:
//!
//! 1. `{{PLACEHOLDER}}`: the user's selection (or the component's default
//!    text), wrapped in a `<span data-id="...">` container so the host can
//!    locate and select the inserted node afterwards
//! 2. `{{VARIANTS}}`: space-joined enabled variant CSS classes
//! 3. `{{VARIANTSHTML}}`: concatenated enabled variant HTML, same order
//! 4. `{{FLAVOR}}`: the active flavor name (empty for flavor-less
//!    components, regardless of the UI selection)
//! 5. `{{COMPONENT}}` / `{{CATEGORY}}`: literal names
//! 6. `{{@ID}}`: a fresh random identifier **per occurrence**
//! 7. `{{#key}}`: localized strings from a prefetched [`LangStrings`] table;
//!    unresolved keys become the empty string
//!
//! A token absent from the template makes its step a no-op. Composition is a
//! pure function of its inputs except for the randomness in steps 1 and 6;
//! it performs no network or storage access, so variant HTML and language
//! strings must be prefetched by the collaborator.


use crate::catalog::{Catalog, Component};
use chrono::Utc;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;
use uuid::Uuid;

/// Token replaced with the wrapped selection or default text.
pub const TOKEN_PLACEHOLDER: &str = "{{PLACEHOLDER}}";
/// Token replaced with the space-joined enabled variant classes.
pub const TOKEN_VARIANTS: &str = "{{VARIANTS}}";
/// Token replaced with the concatenated enabled variant HTML.
pub const TOKEN_VARIANTS_HTML: &str = "{{VARIANTSHTML}}";
/// Token replaced with the active flavor name.
pub const TOKEN_FLAVOR: &str = "{{FLAVOR}}";
/// Token replaced with the component name.
pub const TOKEN_COMPONENT: &str = "{{COMPONENT}}";
/// Token replaced with the category name.
pub const TOKEN_CATEGORY: &str = "{{CATEGORY}}";

static ID_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{@ID\}\}").expect("static pattern compiles"));
static LANG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{#([^}]*)\}\}").expect("static pattern compiles"));

/// Prefetched localized strings, keyed by language-string key.
///
/// The localization backend is a collaborator; the engine only consumes a
/// resolved table. Missing keys resolve to the empty string.
#[derive(Debug, Clone, Default)]
pub struct LangStrings(HashMap<String, String>);

impl LangStrings {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a resolved string.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Resolved string for a key, or the empty string when unresolved.
    pub fn resolve(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }
}

impl FromIterator<(String, String)> for LangStrings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything composition needs, resolved ahead of time by the session.
#[derive(Debug)]
pub struct ComposeInput<'a> {
    /// The component whose template is being instantiated.
    pub component: &'a Component,
    /// Name of the component's category.
    pub category_name: &'a str,
    /// Flavor selected in the UI ("" when none).
    pub flavor: &'a str,
    /// The user's current selection HTML ("" when nothing is selected).
    pub selected_text: &'a str,
    /// Enabled variant CSS classes, in toggle order.
    pub variant_classes: &'a [String],
    /// Concatenated enabled variant HTML, in the same order.
    pub variants_html: &'a str,
    /// Prefetched localized strings.
    pub strings: &'a LangStrings,
}

/// Composes the final markup for a component insertion.
///
/// Deterministic modulo the randomly generated identifiers: two calls with
/// identical inputs differ only in `data-id` values and `{{@ID}}`
/// substitutions.
pub fn compose_markup(input: &ComposeInput<'_>) -> String {
    let component = input.component;
    trace!(component = %component.name, flavor = %input.flavor, "compose markup");

    let placeholder = if input.selected_text.is_empty() {
        component.text.as_str()
    } else {
        input.selected_text
    };
    let wrapped = format!(
        r#"<span data-id="{}">{placeholder}</span>"#,
        random_element_id()
    );
    let mut code = component.code.replacen(TOKEN_PLACEHOLDER, &wrapped, 1);

    code = code.replacen(TOKEN_VARIANTS, &input.variant_classes.join(" "), 1);
    code = code.replacen(TOKEN_VARIANTS_HTML, input.variants_html, 1);

    // A component without flavors never has an active flavor, regardless of
    // what is selected in the UI.
    let flavor = if component.flavors.is_empty() { "" } else { input.flavor };
    code = code.replacen(TOKEN_FLAVOR, flavor, 1);

    code = code.replacen(TOKEN_COMPONENT, &component.name, 1);
    code = code.replacen(TOKEN_CATEGORY, input.category_name, 1);

    code = apply_random_ids(&code);
    apply_lang_strings(&code, input.strings)
}

/// Replaces every `{{@ID}}` occurrence with a distinct random identifier.
fn apply_random_ids(text: &str) -> String {
    ID_TOKEN.replace_all(text, |_: &regex::Captures<'_>| random_element_id()).into_owned()
}

/// Replaces every `{{#key}}` occurrence with its resolved string.
fn apply_lang_strings(text: &str, strings: &LangStrings) -> String {
    LANG_TOKEN
        .replace_all(text, |caps: &regex::Captures<'_>| strings.resolve(&caps[1]).to_string())
        .into_owned()
}

/// Generates a short random identifier: `R{entropy}-{millis}`.
///
/// Practically unique within a session; not cryptographically secure, and
/// collisions are not a correctness concern.
pub fn random_element_id() -> String {
    let entropy = Uuid::new_v4().simple().to_string();
    format!("R{}-{}", &entropy[..8], Utc::now().timestamp_millis())
}

/// Collects every language-string key referenced by the catalog's component
/// templates and default texts, first occurrence first, without duplicates.
///
/// The collaborator resolves these in one batch before composing.
pub fn collect_string_keys(catalog: &Catalog) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for component in catalog.components() {
        for field in [&component.code, &component.text] {
            for caps in LANG_TOKEN.captures_iter(field) {
                let key = &caps[1];
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        }
    }
    keys
}
