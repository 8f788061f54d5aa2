//! Error types for document parsing.

use crate::types::FileType;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while detecting, extracting, or rendering documents.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to extract text from a PDF.
    #[error("PDF parsing error: {0}")]
    PdfParseError(String),

    /// Failed to extract elements from an otherwise readable file.
    #[error("Text extraction error: {0}")]
    ExtractionError(String),

    /// ZIP archive error (for DOCX and PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for DOCX and PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// The stream's format section is not an unstructured document format.
    #[error("Invalid format config: {0}")]
    InvalidFormatConfig(String),

    /// No extraction backend is registered for a supported file type.
    #[error("No extraction backend available for file type {0}")]
    BackendUnavailable(FileType),

    /// A single file could not be turned into a record.
    ///
    /// Raised both for unsupported file types and for failures inside an
    /// extraction backend.
    #[error(
        "Error parsing record. This could be due to a mismatch between the config's file type \
         and the actual file type, or because the file or record is not parseable. \
         Contact Support if you need assistance.\nfilename={filename} message={message}"
    )]
    RecordParse { filename: String, message: String },
}

impl Error {
    /// Create a record parse error for the given file.
    pub fn record_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Whether this error describes a problem with the file content rather
    /// than with I/O or configuration.
    pub fn is_record_parse(&self) -> bool {
        matches!(self, Self::RecordParse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parse_message() {
        let err = Error::record_parse("path/to/file.xyz", "weird parsing error");
        let message = err.to_string();

        assert!(message.starts_with("Error parsing record."));
        assert!(message.ends_with("\nfilename=path/to/file.xyz message=weird parsing error"));
        assert!(err.is_record_parse());
    }

    #[test]
    fn test_io_error_is_not_record_parse() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!err.is_record_parse());
    }
}
