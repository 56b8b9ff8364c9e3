//! ZIP bundle handling: exchange document plus binary assets.
//!
//! A bundle carries the XML document as `elements_export.xml` at the
//! archive root and every asset file under its category-relative path
//! (`{categoryId}/{filename}`). On read, the legacy document name
//! `c4l_export.xml` is accepted as well; everything that is not the
//! document is treated as an asset.
//!
//! Asset synchronization is content-addressed: incoming files are compared
//! to the existing store by SHA-256, so re-importing a bundle reports every
//! file as unchanged and writes nothing.

use crate::catalog::{Catalog, EntityId};
use crate::core::{ElementsError, Result};
use crate::exchange::exporter;
use crate::exchange::importer;
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Write};
use tracing::{debug, trace};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Document file name inside the bundle.
pub const EXPORT_XML_NAME: &str = "elements_export.xml";

/// Legacy document file name, accepted on read.
pub const LEGACY_EXPORT_XML_NAME: &str = "c4l_export.xml";

/// One binary asset, addressed by its archive-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Path inside the bundle, `{categoryId}/{filename}`.
    pub path: String,
    pub content: Vec<u8>,
}

impl AssetFile {
    /// Creates an asset from a path and raw content.
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.content))
    }
}

/// Writes a bundle from already-serialized XML and a set of assets.
///
/// # Errors
///
/// Archive construction failures only.
pub fn write_archive(xml: &str, assets: &[AssetFile]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(EXPORT_XML_NAME, options)?;
    writer.write_all(xml.as_bytes())?;
    for asset in assets {
        writer.start_file(asset.path.as_str(), options)?;
        writer.write_all(&asset.content)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Serializes a catalog (optionally scoped to one category) and bundles it
/// with the given assets.
pub fn export_archive(
    catalog: &Catalog,
    scope: Option<EntityId>,
    assets: &[AssetFile],
) -> Result<Vec<u8>> {
    debug!(?scope, assets = assets.len(), "exporting bundle");
    let xml = exporter::serialize(catalog, scope)?;
    write_archive(&xml, assets)
}

/// Splits a bundle into its XML document and asset files.
///
/// # Errors
///
/// [`ElementsError::MissingExportDocument`] when neither the current nor
/// the legacy document name is present, or archive read failures.
pub fn read_archive(bytes: &[u8]) -> Result<(String, Vec<AssetFile>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut xml: Option<String> = None;
    let mut assets = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        if name == EXPORT_XML_NAME || (xml.is_none() && name == LEGACY_EXPORT_XML_NAME) {
            xml = Some(String::from_utf8_lossy(&content).into_owned());
        } else {
            trace!(path = %name, bytes = content.len(), "bundle asset");
            assets.push(AssetFile { path: name, content });
        }
    }

    match xml {
        Some(xml) => Ok((xml, assets)),
        None => Err(ElementsError::MissingExportDocument {
            expected: EXPORT_XML_NAME,
            legacy: LEGACY_EXPORT_XML_NAME,
        }),
    }
}

/// Merges incoming assets into an existing store, comparing by SHA-256.
///
/// Returns one result line per incoming file. With `simulate` set, the
/// store is untouched and the lines describe what a real run would do.
pub fn sync_assets(
    store: &mut Vec<AssetFile>,
    incoming: &[AssetFile],
    simulate: bool,
) -> Vec<String> {
    let mut results = Vec::new();
    for asset in incoming {
        match store.iter_mut().find(|existing| existing.path == asset.path) {
            Some(existing) if existing.digest() == asset.digest() => {
                results.push(format!("File \"{}\" is unchanged", asset.path));
            }
            Some(existing) => {
                results.push(format!("Replace file \"{}\"", asset.path));
                if !simulate {
                    existing.content = asset.content.clone();
                }
            }
            None => {
                results.push(format!("New file \"{}\"", asset.path));
                if !simulate {
                    store.push(asset.clone());
                }
            }
        }
    }
    results
}

/// Imports a full bundle: merges the document into the catalog and the
/// assets into the store. The combined result log lists entities first,
/// then files.
///
/// With `simulate` set, neither the catalog nor the store is written.
pub fn import_archive(
    catalog: &mut Catalog,
    store: &mut Vec<AssetFile>,
    bytes: &[u8],
    simulate: bool,
) -> Result<Vec<String>> {
    let (xml, assets) = read_archive(bytes)?;
    let mut results = importer::import_xml(catalog, &xml, simulate)?;
    results.extend(sync_assets(store, &assets, simulate));
    Ok(results)
}
