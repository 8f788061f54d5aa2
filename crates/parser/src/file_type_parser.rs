//! The contract between a file-based source and a file type parser.

use crate::config::StreamConfig;
use crate::record::OutputRecord;
use crate::remote_file::RemoteFile;
use crate::schema::Schema;
use crate::stream_reader::{FileReadMode, StreamReader};
use async_trait::async_trait;
use docmark_core::Result;

/// Lazily produced records for one file.
pub type Records<'a> = Box<dyn Iterator<Item = Result<OutputRecord>> + 'a>;

/// Turns files of one format into records.
#[async_trait]
pub trait FileTypeParser: Send + Sync {
    /// How many files schema inference should look at; `None` for all.
    fn parser_max_n_files_for_schema_inference(&self) -> Option<usize> {
        None
    }

    /// How many files the host should try to parse when checking
    /// availability; `None` for all.
    fn parser_max_n_files_for_parsability(&self) -> Option<usize> {
        None
    }

    /// How files should be opened for this parser.
    fn file_read_mode(&self) -> FileReadMode;

    /// Infer the schema of records produced from `file`.
    async fn infer_schema(
        &self,
        config: &StreamConfig,
        file: &RemoteFile,
        stream_reader: &dyn StreamReader,
    ) -> Result<Schema>;

    /// Parse `file` into records. Work happens as the iterator is consumed.
    fn parse_records<'a>(
        &'a self,
        config: &'a StreamConfig,
        file: &'a RemoteFile,
        stream_reader: &'a dyn StreamReader,
    ) -> Records<'a>;
}
