//! Descriptor of a file discovered by the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file in the source, as listed by the host's stream reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Location of the file; also used as the record's document key.
    pub uri: String,

    /// Last modification time reported by the source.
    pub last_modified: DateTime<Utc>,

    /// MIME type, for sources that report one.
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl RemoteFile {
    pub fn new(uri: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            uri: uri.into(),
            last_modified,
            mime_type: None,
        }
    }

    /// Attach the MIME type reported by the source.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}
