//! DOCX (Office Open XML) backend for document element extraction.
//!
//! Parses .docx files which are ZIP archives containing WordprocessingML.

pub mod parser;

pub use parser::DocxParser;
