//! A full editing session: load preferences, toggle variants, compose
//! markup, flush preferences.

use crate::common;
use elements_core::compose::{ComposeInput, LangStrings, compose_markup};
use elements_core::resolver::VariantResolver;
use elements_core::styles;
use serde_json::Value;

#[test]
fn toggles_flow_into_composed_markup() {
    common::init_test_logging();
    let catalog = common::sample_catalog();
    let mut resolver = VariantResolver::new(&catalog);

    resolver.enable_variant("quote", "border", "boxed");
    resolver.enable_variant("quote", "shadow", "boxed");

    let component = catalog.component_by_name("quote").unwrap();
    let flavor = resolver.active_flavor(component, "boxed");
    let classes = resolver.enabled_variant_classes("quote", flavor);
    let html = resolver.enabled_variants_html("quote", flavor);

    let mut strings = LangStrings::new();
    strings.insert("tiplabel", "Tip:");
    let markup = compose_markup(&ComposeInput {
        component,
        category_name: &component.categoryname,
        flavor,
        selected_text: "<em>chosen</em>",
        variant_classes: &classes,
        variants_html: &html,
        strings: &strings,
    });

    // Toggle order: border (legacy prefix) before shadow.
    assert!(markup.contains("c4l-border-variant elements-shadow-variant"));
    assert!(markup.contains("boxed"));
    assert!(markup.contains("<em>chosen</em>"));
    assert!(markup.contains("shadow-marker"));
    assert!(!markup.contains("{{"));
}

#[test]
fn preference_payload_survives_a_session_round_trip() {
    common::init_test_logging();
    let catalog = common::sample_catalog();

    let exported = {
        let mut resolver = VariantResolver::new(&catalog);
        resolver.enable_variant("quote", "shadow", "boxed");
        resolver.enable_variant("quote", "border", "");
        resolver.export_preferences()
    };

    // The payload is the legacy JSON shape keyed by ids.
    let value: Value = serde_json::from_str(&exported).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert!(object.keys().any(|k| k.contains('-')));

    let mut next_session = VariantResolver::new(&catalog);
    next_session.load_preferences(Some(&exported));
    assert!(next_session.is_variant_enabled("quote", "shadow", "boxed"));
    assert!(next_session.is_variant_enabled("quote", "border", ""));
    // Flavor contexts stay isolated.
    assert!(!next_session.is_variant_enabled("quote", "shadow", ""));
}

#[test]
fn stale_preferences_degrade_without_errors() {
    common::init_test_logging();
    let catalog = common::sample_catalog();
    let mut resolver = VariantResolver::new(&catalog);

    // References ids no catalog entity has anymore.
    resolver.load_preferences(Some(r#"{"9999": [12345], "bogus": [1]}"#));
    assert!(!resolver.is_variant_enabled("quote", "shadow", ""));
    assert!(resolver.enabled_variant_classes("quote", "").is_empty());

    // A damaged payload starts the session empty instead of failing.
    resolver.load_preferences(Some("not json"));
    assert_eq!(resolver.export_preferences(), "{}");
}

#[test]
fn generated_styles_cover_the_whole_catalog() {
    common::init_test_logging();
    let catalog = common::sample_catalog();

    let css = styles::build_css(&catalog);
    assert!(css.contains(".elements-quote { font-style: italic; }"));
    assert!(css.contains(".boxed { border: 1px solid; }"));
    // The hidden component gets a hide rule, visible ones do not.
    assert!(css.contains("button[class^='elements-tip-icon']"));
    assert!(!css.contains("button[class^='elements-quote-icon']"));

    let js = styles::build_js(&catalog);
    assert!(js.starts_with("/*"));
}
