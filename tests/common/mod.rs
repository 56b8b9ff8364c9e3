//! Shared fixtures for the integration test suite.

// Allow dead code because these utilities are shared across test files and
// not every file uses all of them.
#![allow(dead_code)]

use elements_core::catalog::{
    Catalog, Category, Component, ComponentFlavor, ComponentVariant, Flavor, Variant,
};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes tracing output for tests once per process.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A small but complete catalog: two categories, three components, flavors,
/// variants and both join tables populated.
pub fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::new();

    let mut textstyles = Category::new("textstyles", "Text styles").unwrap();
    textstyles.displayorder = 1;
    textstyles.css = ".elements-textstyles { margin: 0; }".to_string();
    let textstyles_id = catalog.insert_category(textstyles).unwrap();

    let mut boxes = Category::new("boxes", "Boxes").unwrap();
    boxes.displayorder = 2;
    let boxes_id = catalog.insert_category(boxes).unwrap();

    let mut quote = Component::new("quote", "Quote").unwrap();
    quote.category = textstyles_id;
    quote.categoryname = "textstyles".to_string();
    quote.code =
        r#"<blockquote class="elements-quote {{FLAVOR}} {{VARIANTS}}">{{PLACEHOLDER}}{{VARIANTSHTML}}</blockquote>"#
            .to_string();
    quote.text = "Lorem ipsum".to_string();
    quote.flavors = vec!["boxed".to_string()];
    quote.variants = vec!["shadow".to_string(), "border".to_string()];
    quote.css = ".elements-quote { font-style: italic; }".to_string();
    quote.iconurl = format!("@@ASSETS@@/{textstyles_id}/quote.svg");
    catalog.insert_component(quote).unwrap();

    let mut heading = Component::new("heading", "Heading").unwrap();
    heading.category = textstyles_id;
    heading.categoryname = "textstyles".to_string();
    heading.code = r#"<h3 id="{{@ID}}">{{PLACEHOLDER}}</h3>"#.to_string();
    heading.text = "Heading".to_string();
    catalog.insert_component(heading).unwrap();

    let mut tip = Component::new("tip", "Tip").unwrap();
    tip.category = boxes_id;
    tip.categoryname = "boxes".to_string();
    tip.code = r#"<div class="elements-tip">{{#tiplabel}}{{PLACEHOLDER}}</div>"#.to_string();
    tip.text = "Did you know?".to_string();
    tip.hideforstudents = true;
    catalog.insert_component(tip).unwrap();

    let mut boxed = Flavor::new("boxed", "Boxed").unwrap();
    boxed.categoryname = "textstyles".to_string();
    boxed.css = ".boxed { border: 1px solid; }".to_string();
    catalog.insert_flavor(boxed).unwrap();

    let mut shadow = Variant::new("shadow", "Shadow").unwrap();
    shadow.content = "<span class=\"shadow-marker\"></span>".to_string();
    shadow.categoryname = "textstyles".to_string();
    catalog.insert_variant(shadow).unwrap();

    let mut border = Variant::new("border", "Border").unwrap();
    border.c4lcompatibility = true;
    border.categoryname = "textstyles".to_string();
    catalog.insert_variant(border).unwrap();

    catalog.insert_comp_flavor(ComponentFlavor {
        id: 0,
        componentname: "quote".to_string(),
        flavorname: "boxed".to_string(),
        iconurl: String::new(),
    });
    catalog.insert_comp_variant(ComponentVariant {
        id: 0,
        componentname: "quote".to_string(),
        variant: "shadow".to_string(),
    });
    catalog.insert_comp_variant(ComponentVariant {
        id: 0,
        componentname: "quote".to_string(),
        variant: "border".to_string(),
    });

    catalog
}
