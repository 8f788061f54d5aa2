//! PDF backend for document element extraction.
//!
//! Text is pulled out of the PDF's content streams and segmented into
//! elements by layout cues that survive extraction: blank lines, bullet
//! markers, and short unpunctuated lines.

pub mod parser;

pub use parser::PdfParser;
