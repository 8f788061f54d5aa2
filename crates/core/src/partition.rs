//! The extraction backend interface.

use crate::error::Result;
use crate::types::{DocumentElement, FileType};
use std::io::{Read, Seek};

/// A readable, seekable byte source.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Splits one binary document format into an ordered list of elements.
pub trait Partition: Send + Sync {
    /// The file type this backend handles.
    fn file_type(&self) -> FileType;

    /// Extract elements in reading order.
    fn partition(&self, reader: &mut dyn ReadSeek) -> Result<Vec<DocumentElement>>;
}
