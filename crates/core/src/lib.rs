//! Core domain types, container access, and XML traversal for extracting
//! text and images from Office Open XML documents.

pub mod container;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fixture;
pub mod images;
pub mod persist;
pub mod rels;
pub mod text;
pub mod types;
pub mod xml;

pub use container::Container;
pub use error::{Error, Result};
pub use images::ImageSink;
pub use rels::{Relationship, Relationships};
pub use types::{
    DocumentContent, DocumentKind, ExtractOptions, Extraction, ExtractionMetadata,
    ExtractionResult, ImageRef, ImageScope, SheetContent, SlideContent, Warning,
};
pub use xml::{Element, XmlNode};
