//! The workbook-wide shared-string table.

use office_core::xml::{self, Element};
use office_core::Result;

/// Deduplicated strings referenced from cells by index.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parse `xl/sharedStrings.xml`.
    pub fn parse(xml_content: &str) -> Result<Self> {
        let root = xml::parse(xml_content)?;
        let strings = root.children("si").map(string_item_text).collect();
        Ok(Self { strings })
    }

    /// The string at `index`, if within bounds.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Resolve a cell's raw value as an index into the table.
    ///
    /// Non-numeric or out-of-range indices resolve to an empty string.
    pub fn resolve(&self, raw: &str) -> String {
        raw.trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| self.get(index))
            .unwrap_or_default()
            .to_string()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Text of a string item (`<si>`) or inline string (`<is>`): either a plain
/// `<t>` or the concatenated `<t>` of its rich-text runs.
pub(crate) fn string_item_text(item: &Element) -> String {
    if let Some(text) = item.child("t") {
        return text.text();
    }

    item.children("r")
        .filter_map(|run| run.child("t"))
        .map(|t| t.text())
        .collect()
}
