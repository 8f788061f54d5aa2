//! PPTX (Office Open XML) backend for document element extraction.
//!
//! Parses .pptx files which are ZIP archives containing XML documents.

pub mod parser;

pub use parser::PptxParser;
