//! The portable exchange document: a tagged XML tree with one section per
//! table.
//!
//! Layout:
//!
//! ```xml
//! <elements>
//!   <tiny_elements_compcat>
//!     <row>
//!       <id>1</id>
//!       <name>textstyles</name>
//!       ...
//!     </row>
//!   </tiny_elements_compcat>
//!   ...
//! </elements>
//! ```
//!
//! All row fields are captured as plain strings at this stage; type coercion
//! happens in the importer. Six legacy `tiny_c4l_*` section names are
//! accepted as synonyms on read; only current names are ever written.
//! Unknown section names are skipped.

use crate::core::{ElementsError, Result};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

/// Root element name.
pub const ROOT: &str = "elements";
/// Row item element name.
pub const ITEM: &str = "row";

/// Category table.
pub const TABLE_CATEGORY: &str = "tiny_elements_compcat";
/// Component table.
pub const TABLE_COMPONENT: &str = "tiny_elements_component";
/// Component-flavor join table.
pub const TABLE_COMP_FLAVOR: &str = "tiny_elements_comp_flavor";
/// Component-variant join table.
pub const TABLE_COMP_VARIANT: &str = "tiny_elements_comp_variant";
/// Flavor table.
pub const TABLE_FLAVOR: &str = "tiny_elements_flavor";
/// Variant table.
pub const TABLE_VARIANT: &str = "tiny_elements_variant";

/// Every table a document may carry, in processing order.
pub const TABLES: [&str; 6] = [
    TABLE_CATEGORY,
    TABLE_COMPONENT,
    TABLE_COMP_FLAVOR,
    TABLE_COMP_VARIANT,
    TABLE_FLAVOR,
    TABLE_VARIANT,
];

/// Tables that may be absent from a document without failing the import.
pub const OPTIONAL_TABLES: [&str; 2] = [TABLE_COMP_FLAVOR, TABLE_COMP_VARIANT];

/// Legacy section names accepted on read, mapped to their current names.
const TABLE_ALIASES: [(&str, &str); 6] = [
    ("tiny_c4l_compcat", TABLE_CATEGORY),
    ("tiny_c4l_component", TABLE_COMPONENT),
    ("tiny_c4l_comp_flavor", TABLE_COMP_FLAVOR),
    ("tiny_c4l_comp_variant", TABLE_COMP_VARIANT),
    ("tiny_c4l_flavor", TABLE_FLAVOR),
    ("tiny_c4l_variant", TABLE_VARIANT),
];

/// Resolves a section name to its current table name, handling aliases.
/// `None` for unknown sections.
pub fn canonical_table_name(name: &str) -> Option<&'static str> {
    if let Some(current) = TABLES.iter().find(|t| **t == name) {
        return Some(current);
    }
    TABLE_ALIASES.iter().find(|(alias, _)| *alias == name).map(|(_, current)| *current)
}

/// One exported row: an ordered list of column name → string value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Field value, if the column is present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Field value, empty string when the column is absent.
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// All fields in document order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// A parsed (or under-construction) exchange document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tables: Vec<(String, Vec<Row>)>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a section for this table exists (aliases already
    /// canonicalized at parse time).
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.iter().any(|(name, _)| name == table)
    }

    /// Rows of a table; empty for absent tables.
    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Appends a row, creating the section on first use.
    pub fn push_row(&mut self, table: &str, row: Row) {
        match self.tables.iter_mut().find(|(name, _)| name == table) {
            Some((_, rows)) => rows.push(row),
            None => self.tables.push((table.to_string(), vec![row])),
        }
    }

    /// Ensures a section exists even when it has no rows. Exports always
    /// write all six sections so re-imports never miss a required table.
    pub fn ensure_table(&mut self, table: &str) {
        if !self.has_table(table) {
            self.tables.push((table.to_string(), Vec::new()));
        }
    }

    /// Parses a document from XML text.
    ///
    /// Legacy alias section names are canonicalized; unknown sections are
    /// skipped. Field values are captured as strings without coercion.
    ///
    /// # Errors
    ///
    /// [`ElementsError::MalformedDocument`] when the text is not
    /// well-formed XML.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut document = Self::new();
        // Current position in the <root>/<table>/<row>/<column> hierarchy.
        let mut table: Option<&'static str> = None;
        let mut row: Option<Row> = None;
        let mut column: Option<String> = None;
        let mut value = String::new();
        let mut depth = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|err| ElementsError::MalformedDocument { reason: err.to_string() })?;
            match event {
                Event::Start(start) => {
                    depth += 1;
                    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    match depth {
                        1 => {} // root element, any name accepted
                        2 => {
                            table = canonical_table_name(&name);
                            if table.is_none() {
                                debug!(section = %name, "skipping unknown document section");
                            }
                        }
                        3 => {
                            if table.is_some() && name == ITEM {
                                row = Some(Row::new());
                            }
                        }
                        4 => {
                            if row.is_some() {
                                column = Some(name);
                                value.clear();
                            }
                        }
                        _ => {}
                    }
                }
                Event::Empty(empty) => {
                    let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                    match depth {
                        // An empty section element still counts as present.
                        1 => {
                            if let Some(current_table) = canonical_table_name(&name) {
                                document.ensure_table(current_table);
                            }
                        }
                        2 => {
                            if let Some(current_table) = table {
                                if name == ITEM {
                                    document.push_row(current_table, Row::new());
                                }
                            }
                        }
                        // An empty column element (<css/>) is an empty value.
                        3 => {
                            if let Some(current) = row.as_mut() {
                                current.set(name, "");
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(text) => {
                    if column.is_some() {
                        let chunk = text.unescape().map_err(|err| {
                            ElementsError::MalformedDocument { reason: err.to_string() }
                        })?;
                        value.push_str(&chunk);
                    }
                }
                Event::CData(cdata) => {
                    if column.is_some() {
                        value.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                    }
                }
                Event::End(_) => {
                    match depth {
                        4 => {
                            if let (Some(current), Some(name)) = (row.as_mut(), column.take()) {
                                current.set(name, std::mem::take(&mut value));
                            }
                        }
                        3 => {
                            if let (Some(current_table), Some(finished)) = (table, row.take()) {
                                document.push_row(current_table, finished);
                            }
                        }
                        2 => {
                            // Record the section even if it had no rows.
                            if let Some(current_table) = table.take() {
                                document.ensure_table(current_table);
                            }
                        }
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if document.tables.is_empty() {
            return Err(ElementsError::MalformedDocument {
                reason: "no table sections found".to_string(),
            });
        }
        Ok(document)
    }

    /// Serializes the document to indented XML text.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(ROOT)))?;
        for (table, rows) in &self.tables {
            writer.write_event(Event::Start(BytesStart::new(table.as_str())))?;
            for row in rows {
                writer.write_event(Event::Start(BytesStart::new(ITEM)))?;
                for (name, value) in row.fields() {
                    writer.write_event(Event::Start(BytesStart::new(name.as_str())))?;
                    if !value.is_empty() {
                        writer.write_event(Event::Text(BytesText::new(value)))?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                }
                writer.write_event(Event::End(BytesEnd::new(ITEM)))?;
            }
            writer.write_event(Event::End(BytesEnd::new(table.as_str())))?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}
