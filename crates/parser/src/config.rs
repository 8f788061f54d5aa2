//! Stream configuration read by the parser.

use docmark_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// The part of a file-based stream's configuration the parser looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Stream name, used in logs.
    pub name: String,

    /// How files in the stream are parsed.
    pub format: FormatConfig,
}

impl StreamConfig {
    /// A stream of unstructured documents.
    pub fn unstructured(name: impl Into<String>, skip_unprocessable_files: bool) -> Self {
        Self {
            name: name.into(),
            format: FormatConfig::Unstructured(UnstructuredFormat {
                skip_unprocessable_files,
            }),
        }
    }

    /// The unstructured format section, or an error if the stream is
    /// configured for a different format.
    pub fn unstructured_format(&self) -> Result<&UnstructuredFormat> {
        match &self.format {
            FormatConfig::Unstructured(format) => Ok(format),
            other => Err(Error::InvalidFormatConfig(format!(
                "stream '{}' uses the {} format",
                self.name,
                other.filetype()
            ))),
        }
    }
}

/// Format section of a stream, tagged by `filetype`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filetype", rename_all = "lowercase")]
pub enum FormatConfig {
    Unstructured(UnstructuredFormat),
    Csv,
    Jsonl,
    Parquet,
    Avro,
}

impl FormatConfig {
    /// The `filetype` tag of this format.
    pub fn filetype(&self) -> &'static str {
        match self {
            Self::Unstructured(_) => "unstructured",
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
            Self::Parquet => "parquet",
            Self::Avro => "avro",
        }
    }
}

/// Options for parsing unstructured documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstructuredFormat {
    /// Emit a record carrying the error instead of failing the sync when a
    /// file cannot be parsed.
    #[serde(default = "default_skip_unprocessable_files")]
    pub skip_unprocessable_files: bool,
}

impl Default for UnstructuredFormat {
    fn default() -> Self {
        Self {
            skip_unprocessable_files: default_skip_unprocessable_files(),
        }
    }
}

fn default_skip_unprocessable_files() -> bool {
    true
}
