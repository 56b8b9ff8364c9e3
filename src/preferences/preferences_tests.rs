#[cfg(test)]
mod tests {
    use crate::preferences::{
        PREF_CATEGORY, PREF_CATEGORY_FLAVORS, PREF_COMPONENT_VARIANTS, PreferenceKey,
        SessionPrefs, VariantPreferences,
    };
    use std::collections::HashMap;

    #[test]
    fn key_round_trips_through_legacy_string_form() {
        let component = PreferenceKey::Component(12);
        let pair = PreferenceKey::ComponentFlavor(12, 34);
        assert_eq!(component.to_string(), "12");
        assert_eq!(pair.to_string(), "12-34");
        assert_eq!(PreferenceKey::parse("12"), Some(component));
        assert_eq!(PreferenceKey::parse("12-34"), Some(pair));
        assert_eq!(PreferenceKey::parse("nope"), None);
        assert_eq!(PreferenceKey::parse("12-"), None);
    }

    #[test]
    fn enable_is_idempotent_and_preserves_toggle_order() {
        let mut prefs = VariantPreferences::new();
        let key = PreferenceKey::Component(1);
        prefs.enable(key, 20);
        prefs.enable(key, 10);
        prefs.enable(key, 20);
        assert_eq!(prefs.enabled(key), &[20, 10]);
    }

    #[test]
    fn disable_prunes_emptied_keys() {
        let mut prefs = VariantPreferences::new();
        let key = PreferenceKey::ComponentFlavor(1, 2);
        prefs.enable(key, 5);
        prefs.disable(key, 5);
        assert!(prefs.is_empty());
        assert_eq!(prefs.enabled(key), &[] as &[u64]);
        // Disabling again stays a no-op.
        prefs.disable(key, 5);
        assert!(prefs.is_empty());
    }

    #[test]
    fn pruned_keys_never_appear_in_export() {
        let mut prefs = VariantPreferences::new();
        prefs.enable(PreferenceKey::Component(1), 5);
        prefs.enable(PreferenceKey::Component(2), 6);
        prefs.disable(PreferenceKey::Component(1), 5);
        let raw = prefs.export_raw();
        assert!(!raw.contains("\"1\""));
        assert!(raw.contains("\"2\""));
    }

    #[test]
    fn load_replaces_instead_of_merging() {
        let mut prefs = VariantPreferences::new();
        prefs.enable(PreferenceKey::Component(1), 5);
        prefs.load_raw(r#"{"2": [6]}"#).unwrap();
        assert!(prefs.enabled(PreferenceKey::Component(1)).is_empty());
        assert_eq!(prefs.enabled(PreferenceKey::Component(2)), &[6]);
    }

    #[test]
    fn load_accepts_string_ids_and_skips_junk() {
        let mut prefs = VariantPreferences::new();
        prefs
            .load_raw(r#"{"3-4": ["7", 8, null], "not a key": [1], "5": []}"#)
            .unwrap();
        assert_eq!(prefs.enabled(PreferenceKey::ComponentFlavor(3, 4)), &[7, 8]);
        // Empty lists are not materialized.
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn load_rejects_non_json() {
        let mut prefs = VariantPreferences::new();
        assert!(prefs.load_raw("{{{").is_err());
    }

    #[test]
    fn export_round_trips() {
        let mut prefs = VariantPreferences::new();
        prefs.enable(PreferenceKey::Component(12), 3);
        prefs.enable(PreferenceKey::ComponentFlavor(12, 7), 3);
        prefs.enable(PreferenceKey::ComponentFlavor(12, 7), 4);

        let mut reloaded = VariantPreferences::new();
        reloaded.load_raw(&prefs.export_raw()).unwrap();
        assert_eq!(
            reloaded.enabled(PreferenceKey::ComponentFlavor(12, 7)),
            &[3, 4]
        );
        assert_eq!(reloaded.enabled(PreferenceKey::Component(12)), &[3]);
    }

    #[test]
    fn persisted_payloads_round_trip_under_their_store_names() {
        let mut prefs = VariantPreferences::new();
        prefs.enable(PreferenceKey::Component(3), 11);
        let mut session = SessionPrefs::new();
        session.last_category = Some(2);
        session.remember_flavor(2, 7);

        // One entry per preference name, the shape the host's store keeps.
        let store = HashMap::from([
            (PREF_COMPONENT_VARIANTS, prefs.export_raw()),
            (
                PREF_CATEGORY,
                session.last_category.map(|id| id.to_string()).unwrap_or_default(),
            ),
            (PREF_CATEGORY_FLAVORS, session.export_flavors_raw()),
        ]);
        assert_eq!(store.len(), 3);

        let mut reloaded = VariantPreferences::new();
        reloaded.load_raw(&store[PREF_COMPONENT_VARIANTS]).unwrap();
        assert!(reloaded.contains(PreferenceKey::Component(3), 11));

        let mut reopened = SessionPrefs::new();
        reopened.last_category = store[PREF_CATEGORY].parse().ok();
        reopened.load_flavors_raw(&store[PREF_CATEGORY_FLAVORS]).unwrap();
        assert_eq!(reopened.last_category, Some(2));
        assert_eq!(reopened.last_flavor(2), Some(7));
    }

    #[test]
    fn session_prefs_flavor_map_round_trips() {
        let mut session = SessionPrefs::new();
        session.remember_flavor(2, 7);
        session.remember_flavor(5, 9);
        let raw = session.export_flavors_raw();

        let mut reloaded = SessionPrefs::new();
        reloaded.load_flavors_raw(&raw).unwrap();
        assert_eq!(reloaded.last_flavor(2), Some(7));
        assert_eq!(reloaded.last_flavor(5), Some(9));
        assert_eq!(reloaded.last_flavor(99), None);
    }
}
