//! File-based source parser for unstructured documents.
//!
//! [`UnstructuredParser`] implements the host's [`FileTypeParser`] contract:
//! it infers a fixed schema and turns each Markdown, PDF, DOCX or PPTX file
//! into a single record whose content is Markdown.

pub mod backends;
pub mod config;
pub mod file_type_parser;
pub mod record;
pub mod remote_file;
pub mod schema;
pub mod stream_reader;
pub mod unstructured;

pub use backends::{Backends, BackendsBuilder};
pub use config::{FormatConfig, StreamConfig, UnstructuredFormat};
pub use file_type_parser::{FileTypeParser, Records};
pub use record::OutputRecord;
pub use remote_file::RemoteFile;
pub use schema::{FieldSchema, Schema};
pub use stream_reader::{FileHandle, FileReadMode, LocalStreamReader, StreamReader};
pub use unstructured::UnstructuredParser;
