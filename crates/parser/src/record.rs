//! Records emitted for parsed files.

use serde::{Deserialize, Serialize};

/// Column holding the parse error of a degraded record.
pub const PARSE_ERROR_FIELD: &str = "_ab_source_file_parse_error";

/// One record per file.
///
/// Exactly one of `content` and `parse_error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// The file rendered as Markdown.
    pub content: Option<String>,

    /// Unique identifier of the document; the file's URI.
    pub document_key: String,

    /// Why the file could not be parsed.
    #[serde(rename = "_ab_source_file_parse_error")]
    pub parse_error: Option<String>,
}

impl OutputRecord {
    /// A record for a successfully parsed file.
    pub fn parsed(document_key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            document_key: document_key.into(),
            parse_error: None,
        }
    }

    /// A degraded record standing in for a file that could not be parsed.
    pub fn degraded(document_key: impl Into<String>, parse_error: impl Into<String>) -> Self {
        Self {
            content: None,
            document_key: document_key.into(),
            parse_error: Some(parse_error.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.parse_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let record = OutputRecord::degraded("docs/a.csv", "not supported");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["content"], serde_json::Value::Null);
        assert_eq!(value["document_key"], "docs/a.csv");
        assert_eq!(value[PARSE_ERROR_FIELD], "not supported");
    }

    #[test]
    fn test_parsed_record() {
        let record = OutputRecord::parsed("docs/a.md", "# A");
        assert!(!record.is_degraded());
        assert_eq!(record.content.as_deref(), Some("# A"));
    }
}
