//! Catalog → exchange document serialization.
//!
//! Exports either the full catalog or a single category's slice of it. The
//! scoped export is two-phase: categories and components are collected
//! first (establishing the component name set), then the join tables are
//! filtered to those components, and finally only the flavors and variants
//! referenced by the surviving join rows are emitted.

use crate::catalog::{
    Catalog, Category, Component, ComponentFlavor, ComponentVariant, EntityId, Flavor, Variant,
};
use crate::core::Result;
use crate::exchange::document::{
    Document, Row, TABLE_CATEGORY, TABLE_COMP_FLAVOR, TABLE_COMP_VARIANT, TABLE_COMPONENT,
    TABLE_FLAVOR, TABLE_VARIANT, TABLES,
};
use tracing::debug;

fn bool_field(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn category_row(category: &Category) -> Row {
    let mut row = Row::new();
    row.set("id", category.id.to_string());
    row.set("name", category.name.clone());
    row.set("displayname", category.displayname.clone());
    row.set("displayorder", category.displayorder.to_string());
    row.set("css", category.css.clone());
    row
}

fn component_row(component: &Component) -> Row {
    let mut row = Row::new();
    row.set("id", component.id.to_string());
    row.set("name", component.name.clone());
    row.set("displayname", component.displayname.clone());
    row.set("compcat", component.category.to_string());
    row.set("categoryname", component.categoryname.clone());
    row.set("code", component.code.clone());
    row.set("text", component.text.clone());
    row.set("variants", component.variants.join(","));
    row.set("flavors", component.flavors.join(","));
    row.set("displayorder", component.displayorder.to_string());
    row.set("css", component.css.clone());
    row.set("js", component.js.clone());
    row.set("iconurl", component.iconurl.clone());
    row.set("hideforstudents", bool_field(component.hideforstudents));
    row
}

fn comp_flavor_row(link: &ComponentFlavor) -> Row {
    let mut row = Row::new();
    row.set("id", link.id.to_string());
    row.set("componentname", link.componentname.clone());
    row.set("flavorname", link.flavorname.clone());
    row.set("iconurl", link.iconurl.clone());
    row
}

fn flavor_row(flavor: &Flavor) -> Row {
    let mut row = Row::new();
    row.set("id", flavor.id.to_string());
    row.set("name", flavor.name.clone());
    row.set("displayname", flavor.displayname.clone());
    row.set("displayorder", flavor.displayorder.to_string());
    row.set("content", flavor.content.clone());
    row.set("css", flavor.css.clone());
    row.set("categoryname", flavor.categoryname.clone());
    row.set("hideforstudents", bool_field(flavor.hideforstudents));
    row
}

fn comp_variant_row(link: &ComponentVariant) -> Row {
    let mut row = Row::new();
    row.set("id", link.id.to_string());
    row.set("componentname", link.componentname.clone());
    row.set("variant", link.variant.clone());
    row
}

fn variant_row(variant: &Variant) -> Row {
    let mut row = Row::new();
    row.set("id", variant.id.to_string());
    row.set("name", variant.name.clone());
    row.set("displayname", variant.displayname.clone());
    row.set("content", variant.content.clone());
    row.set("css", variant.css.clone());
    row.set("iconurl", variant.iconurl.clone());
    row.set("c4lcompatibility", bool_field(variant.c4lcompatibility));
    row.set("categoryname", variant.categoryname.clone());
    row
}

/// Builds the exchange document for a catalog, optionally scoped to one
/// category and everything transitively reachable from its components.
pub fn build_document(catalog: &Catalog, scope: Option<EntityId>) -> Document {
    let mut document = Document::new();

    // Phase one: categories and their components.
    let mut component_names: Vec<&str> = Vec::new();
    for category in catalog.categories() {
        if scope.is_some_and(|id| id != category.id) {
            continue;
        }
        document.push_row(TABLE_CATEGORY, category_row(category));
    }
    for component in catalog.components() {
        if scope.is_some_and(|id| id != component.category) {
            continue;
        }
        component_names.push(&component.name);
        document.push_row(TABLE_COMPONENT, component_row(component));
    }

    // Phase two: join rows for those components, then the flavors and
    // variants the join rows reference.
    let mut flavor_names: Vec<&str> = Vec::new();
    for link in catalog.comp_flavors() {
        if scope.is_some() && !component_names.contains(&link.componentname.as_str()) {
            continue;
        }
        if !flavor_names.contains(&link.flavorname.as_str()) {
            flavor_names.push(&link.flavorname);
        }
        document.push_row(TABLE_COMP_FLAVOR, comp_flavor_row(link));
    }
    for flavor in catalog.flavors() {
        if scope.is_some() && !flavor_names.contains(&flavor.name.as_str()) {
            continue;
        }
        document.push_row(TABLE_FLAVOR, flavor_row(flavor));
    }

    let mut variant_names: Vec<&str> = Vec::new();
    for link in catalog.comp_variants() {
        if scope.is_some() && !component_names.contains(&link.componentname.as_str()) {
            continue;
        }
        if !variant_names.contains(&link.variant.as_str()) {
            variant_names.push(&link.variant);
        }
        document.push_row(TABLE_COMP_VARIANT, comp_variant_row(link));
    }
    for variant in catalog.variants() {
        if scope.is_some() && !variant_names.contains(&variant.name.as_str()) {
            continue;
        }
        document.push_row(TABLE_VARIANT, variant_row(variant));
    }

    // Every section is written even when empty, so a re-import never trips
    // over a missing required table.
    for table in TABLES {
        document.ensure_table(table);
    }
    document
}

/// Serializes a catalog to XML text, optionally scoped to one category.
///
/// # Errors
///
/// Only XML writing failures; an empty catalog exports an empty (but
/// structurally complete) document.
pub fn serialize(catalog: &Catalog, scope: Option<EntityId>) -> Result<String> {
    debug!(?scope, "exporting catalog");
    build_document(catalog, scope).to_xml()
}
