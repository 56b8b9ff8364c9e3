//! Catalog exchange: XML serialization, merge import and ZIP bundles.
//!
//! The exchange format is a flat XML document with one section per backing
//! table ([`document`]), produced by the [`exporter`] and consumed by the
//! [`importer`]. Bundles ([`archive`]) wrap the document together with
//! binary assets in a ZIP file; [`assets`] rewrites the category-scoped
//! asset references embedded in style and markup fields when an import
//! remaps category ids.
//!
//! Imports are merges, never wipes: entities match on natural keys and
//! existing records are updated in place. Every import can run in
//! simulate-only mode, which produces the full result log without writing.

pub mod archive;
pub mod assets;
pub mod document;
pub mod exporter;
pub mod importer;


pub use archive::{
    AssetFile, EXPORT_XML_NAME, LEGACY_EXPORT_XML_NAME, export_archive, import_archive,
    read_archive, sync_assets, write_archive,
};
pub use assets::{ASSET_BASE, LEGACY_ASSET_BASE, rewrite_asset_ids, rewrite_asset_ids_bulk};
pub use document::{Document, Row};
pub use exporter::{build_document, serialize};
pub use importer::{ImportPlan, import_document, import_xml};
