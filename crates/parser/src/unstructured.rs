//! Parser for unstructured documents.

use crate::backends::Backends;
use crate::config::StreamConfig;
use crate::file_type_parser::{FileTypeParser, Records};
use crate::record::OutputRecord;
use crate::remote_file::RemoteFile;
use crate::schema::Schema;
use crate::stream_reader::{FileReadMode, StreamReader};
use async_trait::async_trait;
use docmark_core::{decode_text, detect_file_type, render_markdown, Error, FileType, ReadSeek, Result};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::sync::OnceLock;

/// Renders Markdown, PDF, DOCX and PPTX files as one Markdown record each.
pub struct UnstructuredParser {
    backends: OnceLock<Backends>,
}

impl UnstructuredParser {
    /// A parser using the built-in backends, set up on first use.
    pub fn new() -> Self {
        Self {
            backends: OnceLock::new(),
        }
    }

    /// A parser using the given backends.
    pub fn with_backends(backends: Backends) -> Self {
        Self {
            backends: OnceLock::from(backends),
        }
    }

    /// The backend registry, building the built-in one if none was given.
    fn backends(&self) -> Result<&Backends> {
        if let Some(backends) = self.backends.get() {
            return Ok(backends);
        }

        let built = Backends::builtin()?;
        log::debug!("Initialized extraction backends: {:?}", built);
        Ok(self.backends.get_or_init(|| built))
    }

    fn parse_record(
        &self,
        config: &StreamConfig,
        file: &RemoteFile,
        stream_reader: &dyn StreamReader,
    ) -> Result<OutputRecord> {
        let format = config.unstructured_format()?;
        let mut handle = stream_reader.open_file(file, self.file_read_mode())?;

        match self.read_file(handle.as_mut(), file) {
            Ok(markdown) => Ok(OutputRecord::parsed(&file.uri, markdown)),
            // Content problems become degraded records when skipping is on;
            // I/O, config and backend setup failures always propagate.
            Err(e) if e.is_record_parse() && format.skip_unprocessable_files => {
                let message = e.to_string();
                log::warn!("File {} caused an error during parsing: {}.", file.uri, message);
                log::warn!("File {} cannot be parsed. Skipping it.", file.uri);
                Ok(OutputRecord::degraded(&file.uri, message))
            }
            Err(e) => Err(e),
        }
    }

    /// Read a file and render it as Markdown.
    fn read_file(&self, handle: &mut dyn ReadSeek, file: &RemoteFile) -> Result<String> {
        let backends = self.backends()?;
        let file_type = get_file_type(handle, file)?;

        if file_type == FileType::Markdown {
            let mut bytes = Vec::new();
            handle.read_to_end(&mut bytes)?;
            return Ok(decode_text(&bytes));
        }

        if !file_type.is_supported() {
            return Err(unsupported_file_type(file, file_type));
        }

        // Backends need the whole document in memory.
        handle.seek(SeekFrom::Start(0))?;
        let mut content = Vec::new();
        handle.read_to_end(&mut content)?;
        handle.seek(SeekFrom::Start(0))?;

        let backend = backends.get(file_type)?;
        log::debug!("Partitioning {} ({} bytes) as {}", file.uri, content.len(), file_type);

        let elements = backend
            .partition(&mut Cursor::new(content))
            .map_err(|e| Error::record_parse(&file.uri, e.to_string()))?;

        Ok(render_markdown(&elements))
    }
}

impl Default for UnstructuredParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileTypeParser for UnstructuredParser {
    /// The schema is static, so one file is enough.
    fn parser_max_n_files_for_schema_inference(&self) -> Option<usize> {
        Some(1)
    }

    /// Parsing is expensive and a successful sample says little about the
    /// rest of the files, so none are checked up front.
    fn parser_max_n_files_for_parsability(&self) -> Option<usize> {
        Some(0)
    }

    fn file_read_mode(&self) -> FileReadMode {
        FileReadMode::ReadBinary
    }

    async fn infer_schema(
        &self,
        config: &StreamConfig,
        file: &RemoteFile,
        stream_reader: &dyn StreamReader,
    ) -> Result<Schema> {
        let format = config.unstructured_format()?;
        let mut handle = stream_reader.open_file(file, self.file_read_mode())?;
        let file_type = get_file_type(handle.as_mut(), file)?;

        if !file_type.is_supported() && !format.skip_unprocessable_files {
            return Err(unsupported_file_type(file, file_type));
        }

        Ok(Schema::unstructured())
    }

    fn parse_records<'a>(
        &'a self,
        config: &'a StreamConfig,
        file: &'a RemoteFile,
        stream_reader: &'a dyn StreamReader,
    ) -> Records<'a> {
        Box::new(std::iter::once_with(move || {
            self.parse_record(config, file, stream_reader)
        }))
    }
}

/// Resolve the type of an open file.
///
/// Content is only read when neither the MIME type nor the URI settle the
/// type, and the handle is rewound to the start afterwards.
fn get_file_type(handle: &mut dyn ReadSeek, file: &RemoteFile) -> Result<FileType> {
    let mime_type = file.mime_type.as_deref();
    let declared = detect_file_type(mime_type, Some(&file.uri), None);
    if declared != FileType::Unknown {
        return Ok(declared);
    }

    let mut content = Vec::new();
    handle.read_to_end(&mut content)?;
    handle.seek(SeekFrom::Start(0))?;

    Ok(detect_file_type(mime_type, Some(&file.uri), Some(&content)))
}

fn unsupported_file_type(file: &RemoteFile, file_type: FileType) -> Error {
    let supported = FileType::SUPPORTED
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    Error::record_parse(
        &file.uri,
        format!(
            "File type {} is not supported. Supported file types are {}",
            file_type, supported
        ),
    )
}
