//! Export/import round trips over the XML document and the ZIP bundle.

use crate::common;
use elements_core::catalog::Catalog;
use elements_core::exchange::{
    AssetFile, EXPORT_XML_NAME, export_archive, import_archive, import_xml, read_archive,
    serialize,
};
use std::fs;

#[test]
fn xml_round_trip_reproduces_the_catalog() {
    common::init_test_logging();
    let source = common::sample_catalog();
    let xml = serialize(&source, None).unwrap();

    let mut target = Catalog::new();
    let results = import_xml(&mut target, &xml, false).unwrap();
    assert!(results.iter().any(|line| line == "New component \"quote\""));

    assert_eq!(source.categories(), target.categories());
    assert_eq!(source.components(), target.components());
    assert_eq!(source.flavors(), target.flavors());
    assert_eq!(source.variants(), target.variants());
    assert_eq!(source.comp_flavors().len(), target.comp_flavors().len());
    assert_eq!(source.comp_variants().len(), target.comp_variants().len());
}

#[test]
fn scoped_export_imports_only_one_category() {
    common::init_test_logging();
    let source = common::sample_catalog();
    let boxes = source.category_by_name("boxes").unwrap().id;
    let xml = serialize(&source, Some(boxes)).unwrap();

    let mut target = Catalog::new();
    import_xml(&mut target, &xml, false).unwrap();

    assert!(target.category_by_name("boxes").is_some());
    assert!(target.category_by_name("textstyles").is_none());
    assert!(target.component_by_name("tip").is_some());
    assert!(target.component_by_name("quote").is_none());
    assert!(target.flavors().is_empty());
    assert!(target.variants().is_empty());
}

#[test]
fn import_remaps_embedded_asset_references() {
    common::init_test_logging();
    let source = common::sample_catalog();
    let xml = serialize(&source, None).unwrap();

    // Occupy a few ids so the import cannot reuse the source's.
    let mut target = Catalog::new();
    for name in ["placeholder_a", "placeholder_b", "placeholder_c"] {
        target
            .insert_category(elements_core::catalog::Category::new(name, name).unwrap())
            .unwrap();
    }
    import_xml(&mut target, &xml, false).unwrap();

    let category = target.category_by_name("textstyles").unwrap();
    let source_category = source.category_by_name("textstyles").unwrap();
    assert_ne!(category.id, source_category.id);

    let quote = target.component_by_name("quote").unwrap();
    assert_eq!(quote.iconurl, format!("@@ASSETS@@/{}/quote.svg", category.id));
    assert_eq!(quote.category, category.id);
}

#[test]
fn bundle_round_trip_through_a_file() {
    common::init_test_logging();
    let source = common::sample_catalog();
    let assets = vec![
        AssetFile::new("1/quote.svg", b"<svg>q</svg>".to_vec()),
        AssetFile::new("1/bg.png", b"PNG".to_vec()),
    ];
    let bytes = export_archive(&source, None, &assets).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elements_export.zip");
    fs::write(&path, &bytes).unwrap();
    let loaded = fs::read(&path).unwrap();

    let (xml, read_assets) = read_archive(&loaded).unwrap();
    assert!(xml.contains("<tiny_elements_component>"));
    assert_eq!(read_assets, assets);

    let mut target = Catalog::new();
    let mut store: Vec<AssetFile> = Vec::new();
    let results = import_archive(&mut target, &mut store, &loaded, false).unwrap();

    assert!(results.iter().any(|line| line == "New file \"1/quote.svg\""));
    assert_eq!(store.len(), 2);
    assert_eq!(target.components().len(), source.components().len());

    // A second import of the same bundle is a pure no-op on the assets.
    let results = import_archive(&mut target, &mut store, &loaded, false).unwrap();
    assert!(results.iter().any(|line| line == "File \"1/quote.svg\" is unchanged"));
    assert_eq!(store.len(), 2);
}

#[test]
fn simulated_bundle_import_writes_nothing() {
    common::init_test_logging();
    let source = common::sample_catalog();
    let assets = vec![AssetFile::new("1/quote.svg", b"<svg/>".to_vec())];
    let bytes = export_archive(&source, None, &assets).unwrap();

    let mut target = Catalog::new();
    let mut store: Vec<AssetFile> = Vec::new();
    let results = import_archive(&mut target, &mut store, &bytes, true).unwrap();

    assert!(!results.is_empty());
    assert!(target.categories().is_empty());
    assert!(store.is_empty());
}

#[test]
fn archive_entry_name_matches_the_export_convention() {
    let bytes = export_archive(&common::sample_catalog(), None, &[]).unwrap();
    let (xml, _) = read_archive(&bytes).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert_eq!(EXPORT_XML_NAME, "elements_export.xml");
}
