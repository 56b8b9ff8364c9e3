//! elements-core - content template catalog and composition engine
//!
//! The data and derivation core behind an editor plugin that inserts styled,
//! reusable content blocks ("components") into rich-text documents.
//! Components are grouped into categories, themed per insertion through
//! flavors, and fine-tuned through toggleable variants. This crate owns the
//! catalog model, the per-user variant state, the template-to-markup
//! composition, and the portable exchange format; editor integration,
//! storage and delivery stay with the host.
//!
//! # Architecture Overview
//!
//! Everything operates on an in-memory [`catalog::Catalog`] snapshot:
//! - The host loads the catalog once per editing session.
//! - The resolution and composition engines only read it.
//! - Only the exchange importer mutates it, through an explicit plan/apply
//!   split so every import can be previewed without writing.
//!
//! Lookups resolve by natural key (entity names), never by id: names are
//! what survives export/import round trips between installations. Runtime
//! lookups follow a soft-miss policy, so stale preference entries or deleted
//! entities degrade to no-ops instead of errors; only the exchange paths
//! return typed errors.
//!
//! # Core Modules
//!
//! - [`catalog`] - Entity records (categories, components, flavors,
//!   variants, join rows) and the catalog snapshot with its lookups
//! - [`resolver`] - Per-user variant enablement keyed by component and
//!   flavor context, backed by the JSON preference payloads
//! - [`compose`] - Token substitution turning a component template plus
//!   resolved state into insertable markup
//! - [`preferences`] - Preference payload encoding shared with the host's
//!   user-preference store
//! - [`exchange`] - XML export/import, asset-reference rewriting and ZIP
//!   bundles
//! - [`styles`] - Aggregate CSS/JS assembly for the whole catalog
//! - [`core`] - Error types shared across the crate
//!
//! # Example
//!
//! ```
//! use elements_core::catalog::{Catalog, Category, Component};
//! use elements_core::compose::{ComposeInput, LangStrings, compose_markup};
//! use elements_core::resolver::VariantResolver;
//!
//! let mut catalog = Catalog::new();
//! let category = catalog
//!     .insert_category(Category::new("textstyles", "Text styles").unwrap())
//!     .unwrap();
//! let mut quote = Component::new("quote", "Quote").unwrap();
//! quote.category = category;
//! quote.code = "<blockquote class=\"{{VARIANTS}}\">{{PLACEHOLDER}}</blockquote>".into();
//! quote.text = "Lorem ipsum".into();
//! catalog.insert_component(quote).unwrap();
//!
//! let resolver = VariantResolver::new(&catalog);
//! let component = catalog.component_by_name("quote").unwrap();
//! let markup = compose_markup(&ComposeInput {
//!     component,
//!     category_name: "textstyles",
//!     flavor: "",
//!     selected_text: "",
//!     variant_classes: &resolver.enabled_variant_classes("quote", ""),
//!     variants_html: "",
//!     strings: &LangStrings::new(),
//! });
//! assert!(markup.contains("Lorem ipsum"));
//! ```

pub mod catalog;
pub mod compose;
pub mod core;
pub mod exchange;
pub mod preferences;
pub mod resolver;
pub mod styles;

pub use crate::core::{ElementsError, Result};
pub use catalog::Catalog;
pub use resolver::VariantResolver;
