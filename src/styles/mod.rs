//! Aggregate stylesheet and script assembly.
//!
//! The editor host serves one generated CSS file and one generated JS file
//! for the whole catalog. This module only assembles those strings; caching
//! and delivery stay with the host.
//!
//! The stylesheet concatenates the per-entity fragments in a fixed order
//! (categories, components, flavors, variants), then the generated icon
//! rules, then the hide-for-students rules. Later fragments can therefore
//! override earlier ones, and a component may rely on its category's rules.

use crate::catalog::Catalog;
use tracing::debug;

const CSS_HEADER: &str = "/* Generated stylesheet for the elements catalog. */";
const JS_HEADER: &str = "/* Generated script for the elements catalog. */";

/// Icon rule for a variant toggle button.
pub fn variant_icon_css(variant: &str, iconurl: &str) -> String {
    format!(
        ".elements-button-variant[data-variant=\"{variant}\"]::before {{\n    \
         background-image: url('{iconurl}');\n}}"
    )
}

/// Icon rule for a component button, optionally specific to one flavor.
pub fn button_icon_css(buttonclass: &str, iconurl: &str, flavor: Option<&str>) -> String {
    let flavorclass = match flavor {
        Some(flavor) if !flavor.is_empty() => format!(".{flavor}"),
        _ => String::new(),
    };
    format!(
        ".elements-{buttonclass}-icon{flavorclass} .elements-button-text::before {{\n    \
         content: url('{iconurl}');\n}}"
    )
}

/// Rule hiding a component's picker button from student users. The host
/// tags the body with `tiny_elements_h4s` for student sessions.
pub fn hide_component_css(name: &str) -> String {
    format!(
        "body.tiny_elements_h4s .elements-buttons-preview button[class^='elements-{name}-icon'],\n\
         body.tiny_elements_h4s .elements-buttons-preview button[class*='elements-{name}-icon'] {{\n    \
         display: none;\n}}"
    )
}

/// Rule hiding a flavor's buttons from student users.
pub fn hide_flavor_css(name: &str) -> String {
    format!(
        "body.tiny_elements_h4s .elements-buttons-flavors button[data-flavor='{name}'] {{\n    \
         display: none;\n}}\n\
         body.tiny_elements_h4s .elements-buttons-preview button[data-flavor='{name}'] {{\n    \
         display: none;\n}}"
    )
}

/// Assembles the aggregate stylesheet for a catalog.
pub fn build_css(catalog: &Catalog) -> String {
    let mut entries: Vec<String> = Vec::new();

    for category in catalog.categories() {
        entries.push(category.css.clone());
    }
    for component in catalog.components() {
        entries.push(component.css.clone());
    }
    for flavor in catalog.flavors() {
        entries.push(flavor.css.clone());
    }
    for variant in catalog.variants() {
        entries.push(variant.css.clone());
    }

    for variant in catalog.variants() {
        if !variant.iconurl.is_empty() {
            entries.push(variant_icon_css(&variant.name, &variant.iconurl));
        }
    }
    for link in catalog.comp_flavors() {
        if !link.iconurl.is_empty() {
            entries.push(button_icon_css(&link.componentname, &link.iconurl, Some(&link.flavorname)));
        }
    }
    for component in catalog.components() {
        if !component.iconurl.is_empty() {
            entries.push(button_icon_css(&component.name, &component.iconurl, None));
        }
    }

    for component in catalog.components() {
        if component.hideforstudents {
            entries.push(hide_component_css(&component.name));
        }
    }
    for flavor in catalog.flavors() {
        if flavor.hideforstudents {
            entries.push(hide_flavor_css(&flavor.name));
        }
    }

    debug!(entries = entries.len(), "assembled stylesheet");
    let mut css = CSS_HEADER.to_string();
    for entry in entries {
        css.push('\n');
        css.push_str(&entry);
    }
    css
}

/// Assembles the aggregate script for a catalog: every component's script
/// fragment in catalog order.
pub fn build_js(catalog: &Catalog) -> String {
    let mut js = JS_HEADER.to_string();
    for component in catalog.components() {
        js.push('\n');
        js.push_str(&component.js);
    }
    js
}

#[cfg(test)]
mod styles_tests;
