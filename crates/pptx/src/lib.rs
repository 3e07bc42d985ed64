//! PPTX (Office Open XML) extraction backend.
//!
//! Reads slide text in slide-number order and writes embedded images to the
//! output directory.

pub mod extractor;

pub use extractor::PresentationExtractor;
