#[cfg(test)]
mod tests {
    use crate::catalog::{Catalog, Category, Component, ComponentFlavor, Flavor, Variant};
    use crate::styles::{
        build_css, build_js, button_icon_css, hide_component_css, hide_flavor_css,
        variant_icon_css,
    };

    fn fixture() -> Catalog {
        let mut catalog = Catalog::new();

        let mut category = Category::new("textstyles", "Text styles").unwrap();
        category.css = ".cat { color: blue; }".to_string();
        catalog.insert_category(category).unwrap();

        let mut component = Component::new("quote", "Quote").unwrap();
        component.css = ".quote { font-style: italic; }".to_string();
        component.js = "console.log('quote');".to_string();
        component.iconurl = "icons/quote.svg".to_string();
        catalog.insert_component(component).unwrap();

        let mut flavor = Flavor::new("boxed", "Boxed").unwrap();
        flavor.css = ".boxed { border: 1px; }".to_string();
        catalog.insert_flavor(flavor).unwrap();

        let mut variant = Variant::new("shadow", "Shadow").unwrap();
        variant.css = ".shadow { box-shadow: none; }".to_string();
        variant.iconurl = "icons/shadow.svg".to_string();
        catalog.insert_variant(variant).unwrap();

        catalog.insert_comp_flavor(ComponentFlavor {
            id: 0,
            componentname: "quote".to_string(),
            flavorname: "boxed".to_string(),
            iconurl: "icons/quote-boxed.svg".to_string(),
        });

        catalog
    }

    #[test]
    fn stylesheet_orders_fragments_before_generated_rules() {
        let css = build_css(&fixture());

        let category = css.find(".cat {").unwrap();
        let component = css.find(".quote {").unwrap();
        let flavor = css.find(".boxed {").unwrap();
        let variant = css.find(".shadow {").unwrap();
        let icon = css.find(".elements-button-variant").unwrap();

        assert!(css.starts_with("/*"));
        assert!(category < component);
        assert!(component < flavor);
        assert!(flavor < variant);
        assert!(variant < icon);
    }

    #[test]
    fn icon_rules_cover_variant_component_and_pairing() {
        let css = build_css(&fixture());

        assert!(css.contains(
            ".elements-button-variant[data-variant=\"shadow\"]::before"
        ));
        assert!(css.contains("background-image: url('icons/shadow.svg')"));
        assert!(css.contains(".elements-quote-icon .elements-button-text::before"));
        assert!(css.contains(".elements-quote-icon.boxed .elements-button-text::before"));
        assert!(css.contains("content: url('icons/quote-boxed.svg')"));
    }

    #[test]
    fn entities_without_icons_produce_no_icon_rules() {
        let mut catalog = Catalog::new();
        catalog.insert_component(Component::new("plain", "Plain").unwrap()).unwrap();
        let css = build_css(&catalog);
        assert!(!css.contains("::before"));
    }

    #[test]
    fn hidden_entities_get_hide_rules() {
        let mut catalog = fixture();
        let mut secret = Component::new("secret", "Secret").unwrap();
        secret.hideforstudents = true;
        catalog.insert_component(secret).unwrap();
        let mut staff = Flavor::new("staff", "Staff only").unwrap();
        staff.hideforstudents = true;
        catalog.insert_flavor(staff).unwrap();

        let css = build_css(&catalog);
        assert!(css.contains("button[class^='elements-secret-icon']"));
        assert!(css.contains("button[data-flavor='staff']"));
        assert!(!css.contains("button[class^='elements-quote-icon']"));
    }

    #[test]
    fn rule_builders_render_expected_selectors() {
        assert_eq!(
            variant_icon_css("shadow", "u.svg"),
            ".elements-button-variant[data-variant=\"shadow\"]::before {\n    background-image: url('u.svg');\n}"
        );
        assert!(button_icon_css("quote", "u.svg", None)
            .starts_with(".elements-quote-icon .elements-button-text::before"));
        assert!(button_icon_css("quote", "u.svg", Some("boxed"))
            .starts_with(".elements-quote-icon.boxed .elements-button-text::before"));
        assert!(hide_component_css("x").contains("display: none;"));
        assert!(hide_flavor_css("x").contains("display: none;"));
    }

    #[test]
    fn script_concatenates_component_fragments() {
        let js = build_js(&fixture());
        assert!(js.starts_with("/*"));
        assert!(js.contains("console.log('quote');"));
    }
}
