//! Core domain types, file type detection, text decoding, and Markdown
//! rendering for document parsing.

pub mod decode;
pub mod detect;
pub mod error;
pub mod markdown;
pub mod partition;
pub mod types;

pub use decode::decode_text;
pub use detect::detect_file_type;
pub use error::{Error, Result};
pub use markdown::{render_markdown, MAX_HEADING_LEVEL};
pub use partition::{Partition, ReadSeek};
pub use types::{DocumentElement, ElementMetadata, FileType};
