//! Access to file content, provided by the host.

use crate::remote_file::RemoteFile;
use chrono::{DateTime, Utc};
use docmark_core::{ReadSeek, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// An open, seekable file.
pub type FileHandle = Box<dyn ReadSeek + Send>;

/// How a parser wants files opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileReadMode {
    Read,
    ReadBinary,
}

/// Opens files listed by the host.
pub trait StreamReader: Send + Sync {
    /// Open a file for reading, positioned at its start.
    fn open_file(&self, file: &RemoteFile, mode: FileReadMode) -> Result<FileHandle>;
}

/// Reads files from a local directory; URIs are paths relative to the root.
#[derive(Debug, Clone)]
pub struct LocalStreamReader {
    root: PathBuf,
}

impl LocalStreamReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Describe a local file. Paths under the root get a root-relative URI.
    pub fn remote_file(&self, path: &Path) -> Result<RemoteFile> {
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let modified = std::fs::metadata(&full_path)?.modified()?;
        let uri = full_path
            .strip_prefix(&self.root)
            .unwrap_or(&full_path)
            .to_string_lossy()
            .replace('\\', "/");

        Ok(RemoteFile::new(uri, DateTime::<Utc>::from(modified)))
    }
}

impl StreamReader for LocalStreamReader {
    fn open_file(&self, file: &RemoteFile, mode: FileReadMode) -> Result<FileHandle> {
        let path = self.root.join(&file.uri);
        log::debug!("Opening {} ({:?})", path.display(), mode);
        let handle = File::open(&path)?;
        Ok(Box::new(BufReader::new(handle)))
    }
}
