//! XLSX (Office Open XML) extraction backend.
//!
//! Reads worksheet rows in workbook order, resolving shared strings, and
//! writes images anchored in drawings to the output directory.

pub mod extractor;
pub mod shared_strings;

pub use extractor::SpreadsheetExtractor;
pub use shared_strings::SharedStrings;
