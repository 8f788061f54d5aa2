//! Discovery schema for unstructured document streams.

use crate::record::PARSE_ERROR_FIELD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON schema type of every field in the schema.
const STRING_TYPE: &str = "string";

/// Schema of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: String,
    pub description: String,
}

impl FieldSchema {
    fn string(description: &str) -> Self {
        Self {
            field_type: STRING_TYPE.to_string(),
            description: description.to_string(),
        }
    }
}

/// Field name to field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(BTreeMap<String, FieldSchema>);

impl Schema {
    /// The schema shared by every unstructured document stream.
    pub fn unstructured() -> Self {
        let fields = [
            (
                "content",
                "Content of the file as markdown. Might be null if the file could not be parsed",
            ),
            (
                "document_key",
                "Unique identifier of the document, e.g. the file path",
            ),
            (
                PARSE_ERROR_FIELD,
                "Error message if the file could not be parsed even though the file is supported",
            ),
        ];

        Self(
            fields
                .into_iter()
                .map(|(name, description)| (name.to_string(), FieldSchema::string(description)))
                .collect(),
        )
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.0.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstructured_schema_json() {
        let value = serde_json::to_value(Schema::unstructured()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "content": {
                    "type": "string",
                    "description": "Content of the file as markdown. Might be null if the file could not be parsed"
                },
                "document_key": {
                    "type": "string",
                    "description": "Unique identifier of the document, e.g. the file path"
                },
                "_ab_source_file_parse_error": {
                    "type": "string",
                    "description": "Error message if the file could not be parsed even though the file is supported"
                }
            })
        );
    }

    #[test]
    fn test_field_lookup() {
        let schema = Schema::unstructured();
        assert_eq!(schema.field("content").unwrap().field_type, "string");
        assert!(schema.field("missing").is_none());
        assert_eq!(schema.field_names().count(), 3);
    }
}
