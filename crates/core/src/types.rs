//! Domain types for representing detected files and extracted content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The resolved type of an input file.
///
/// Only [`FileType::Markdown`], [`FileType::Pdf`], [`FileType::Docx`] and
/// [`FileType::Pptx`] can be turned into records; the remaining variants
/// exist so that detection can name what it found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Markdown,
    Pdf,
    Docx,
    Pptx,
    Xlsx,
    /// Legacy Word document (OLE/CFB).
    Doc,
    /// Legacy PowerPoint presentation (OLE/CFB).
    Ppt,
    /// Legacy Excel workbook (OLE/CFB).
    Xls,
    /// OLE/CFB container whose application could not be determined.
    Ole,
    Txt,
    Csv,
    Tsv,
    Html,
    Xml,
    Json,
    Rtf,
    Epub,
    Odt,
    Eml,
    Msg,
    Png,
    Jpeg,
    Gif,
    Tiff,
    Zip,
    Unknown,
}

impl FileType {
    /// File types that can be converted to Markdown records, in the order
    /// they are reported in error messages.
    pub const SUPPORTED: [FileType; 4] = [
        FileType::Markdown,
        FileType::Pdf,
        FileType::Docx,
        FileType::Pptx,
    ];

    /// Whether files of this type can be converted to records.
    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }

    /// Short upper-case label used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Markdown => "MD",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Pptx => "PPTX",
            Self::Xlsx => "XLSX",
            Self::Doc => "DOC",
            Self::Ppt => "PPT",
            Self::Xls => "XLS",
            Self::Ole => "OLE",
            Self::Txt => "TXT",
            Self::Csv => "CSV",
            Self::Tsv => "TSV",
            Self::Html => "HTML",
            Self::Xml => "XML",
            Self::Json => "JSON",
            Self::Rtf => "RTF",
            Self::Epub => "EPUB",
            Self::Odt => "ODT",
            Self::Eml => "EML",
            Self::Msg => "MSG",
            Self::Png => "PNG",
            Self::Jpeg => "JPG",
            Self::Gif => "GIF",
            Self::Tiff => "TIFF",
            Self::Zip => "ZIP",
            Self::Unknown => "UNK",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata attached to an extracted element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// Nesting depth of the element; for titles this is the heading level.
    pub category_depth: Option<u32>,

    /// 1-based page (or slide) the element was found on, if known.
    pub page_number: Option<u32>,
}

impl ElementMetadata {
    /// Metadata with only a category depth.
    pub fn with_depth(depth: u32) -> Self {
        Self {
            category_depth: Some(depth),
            page_number: None,
        }
    }

    /// Set the page number.
    pub fn on_page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }
}

/// A structural unit extracted from a document, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentElement {
    /// A heading.
    Title {
        text: String,
        #[serde(default)]
        metadata: ElementMetadata,
    },

    /// A single bullet or numbered list entry.
    ListItem {
        text: String,
        #[serde(default)]
        metadata: ElementMetadata,
    },

    /// A mathematical formula in its textual form.
    Formula {
        text: String,
        #[serde(default)]
        metadata: ElementMetadata,
    },

    /// A paragraph of running prose.
    NarrativeText {
        text: String,
        #[serde(default)]
        metadata: ElementMetadata,
    },

    /// Text that could not be classified further.
    Text {
        text: String,
        #[serde(default)]
        metadata: ElementMetadata,
    },

    /// A table flattened to text.
    Table {
        text: String,
        #[serde(default)]
        metadata: ElementMetadata,
    },

    /// An explicit page break; carries no text.
    PageBreak {
        #[serde(default)]
        metadata: ElementMetadata,
    },
}

impl DocumentElement {
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title {
            text: text.into(),
            metadata: ElementMetadata::default(),
        }
    }

    /// A title with an explicit heading level.
    pub fn title_with_depth(text: impl Into<String>, depth: u32) -> Self {
        Self::Title {
            text: text.into(),
            metadata: ElementMetadata::with_depth(depth),
        }
    }

    pub fn list_item(text: impl Into<String>) -> Self {
        Self::ListItem {
            text: text.into(),
            metadata: ElementMetadata::default(),
        }
    }

    pub fn formula(text: impl Into<String>) -> Self {
        Self::Formula {
            text: text.into(),
            metadata: ElementMetadata::default(),
        }
    }

    pub fn narrative_text(text: impl Into<String>) -> Self {
        Self::NarrativeText {
            text: text.into(),
            metadata: ElementMetadata::default(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            metadata: ElementMetadata::default(),
        }
    }

    pub fn table(text: impl Into<String>) -> Self {
        Self::Table {
            text: text.into(),
            metadata: ElementMetadata::default(),
        }
    }

    pub fn page_break() -> Self {
        Self::PageBreak {
            metadata: ElementMetadata::default(),
        }
    }

    /// Textual content of the element, if it has any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Title { text, .. }
            | Self::ListItem { text, .. }
            | Self::Formula { text, .. }
            | Self::NarrativeText { text, .. }
            | Self::Text { text, .. }
            | Self::Table { text, .. } => Some(text),
            Self::PageBreak { .. } => None,
        }
    }

    pub fn metadata(&self) -> &ElementMetadata {
        match self {
            Self::Title { metadata, .. }
            | Self::ListItem { metadata, .. }
            | Self::Formula { metadata, .. }
            | Self::NarrativeText { metadata, .. }
            | Self::Text { metadata, .. }
            | Self::Table { metadata, .. }
            | Self::PageBreak { metadata } => metadata,
        }
    }

    /// Replace the element's metadata.
    pub fn with_metadata(mut self, new: ElementMetadata) -> Self {
        match &mut self {
            Self::Title { metadata, .. }
            | Self::ListItem { metadata, .. }
            | Self::Formula { metadata, .. }
            | Self::NarrativeText { metadata, .. }
            | Self::Text { metadata, .. }
            | Self::Table { metadata, .. }
            | Self::PageBreak { metadata } => *metadata = new,
        }
        self
    }

    /// Set the page number, keeping the rest of the metadata.
    pub fn on_page(self, page_number: u32) -> Self {
        let metadata = self.metadata().on_page(page_number);
        self.with_metadata(metadata)
    }
}
