//! Core types for the elements engine.
//!
//! This module provides the foundation used by every other module:
//!
//! - [`error`] - the [`ElementsError`] type and the crate-wide [`Result`] alias
//!
//! # Error philosophy
//!
//! The engine splits failures into two worlds. Resolution and composition
//! never fail: unknown component, flavor or variant names degrade to
//! `false` / empty results so the editor UI keeps working when catalog and
//! preference data drift apart. The exchange world (import, export,
//! archives) fails loudly with typed errors so the management layer can show
//! the user exactly which table or entity broke.

pub mod error;

pub use error::{ElementsError, Result};
