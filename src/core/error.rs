//! Error handling for the elements engine.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`ElementsError`]) for precise handling in code
//! 2. **Soft-miss tolerance** in the resolution and composition paths: unknown
//!    names never surface as errors there, they degrade to empty results
//!
//! Only the exchange path (import/export/archive) produces errors at all.
//! Structural problems with an import document (unparseable XML, a missing
//! required table) fail the whole operation before anything is written.
//! Row-level problems ([`ElementsError::ImportRow`]) identify the offending
//! entity; rows already processed in the same run are not rolled back.
//!
//! Common library errors are converted automatically:
//! - [`quick_xml::Error`] → [`ElementsError::Xml`]
//! - [`serde_json::Error`] → [`ElementsError::Json`]
//! - [`zip::result::ZipError`] → [`ElementsError::Archive`]
//! - [`std::io::Error`] → [`ElementsError::Io`]

use thiserror::Error;

/// The main error type for catalog exchange and preference parsing.
///
/// Each variant carries enough context to produce a user-facing message
/// identifying the document section or entity that failed, so the management
/// layer can report import problems without inspecting the document itself.
#[derive(Error, Debug)]
pub enum ElementsError {
    /// An entity name does not match the identifier pattern.
    ///
    /// Names must start with a letter or underscore and may only contain
    /// letters, digits, `-` and `_`.
    #[error("invalid {kind} name '{name}': names must start with a letter or underscore and contain only letters, digits, '-' and '_'")]
    InvalidName {
        /// Entity kind ("category", "component", "flavor", "variant").
        kind: &'static str,
        /// The rejected name.
        name: String,
    },

    /// An entity with this name already exists in the catalog.
    #[error("a {kind} named '{name}' already exists")]
    DuplicateName {
        /// Entity kind.
        kind: &'static str,
        /// The conflicting name.
        name: String,
    },

    /// No entity with this id exists in the catalog.
    #[error("no {kind} with id {id} exists")]
    UnknownId {
        /// Entity kind.
        kind: &'static str,
        /// The missing id.
        id: u64,
    },

    /// A required table section is absent from an import document.
    #[error("import document is missing the required table '{table}'")]
    MissingTable {
        /// The current (non-alias) table name.
        table: String,
    },

    /// The import document could not be parsed at all.
    #[error("import document is not a valid elements export: {reason}")]
    MalformedDocument {
        /// Parser diagnostic.
        reason: String,
    },

    /// A single row failed to import.
    #[error("failed to import {kind} '{name}': {reason}")]
    ImportRow {
        /// Entity kind of the failing row.
        kind: &'static str,
        /// Natural key of the failing row (may be empty if the row had none).
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// An export archive does not contain the export document.
    #[error("archive does not contain an export document ('{expected}' or '{legacy}')")]
    MissingExportDocument {
        /// Current document file name.
        expected: &'static str,
        /// Legacy document file name accepted for compatibility.
        legacy: &'static str,
    },

    /// XML reading or writing failed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON (preference payload) parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive reading or writing failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O failure while writing an archive buffer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ElementsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_name_message_names_the_kind() {
        let err = ElementsError::InvalidName {
            kind: "component",
            name: "2bad".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("component"));
        assert!(msg.contains("2bad"));
    }

    #[test]
    fn missing_table_message_names_the_table() {
        let err = ElementsError::MissingTable {
            table: "tiny_elements_compcat".to_string(),
        };
        assert!(err.to_string().contains("tiny_elements_compcat"));
    }

    #[test]
    fn import_row_message_names_the_entity() {
        let err = ElementsError::ImportRow {
            kind: "flavor",
            name: "boxed".to_string(),
            reason: "duplicate id".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("flavor"));
        assert!(msg.contains("boxed"));
        assert!(msg.contains("duplicate id"));
    }
}
