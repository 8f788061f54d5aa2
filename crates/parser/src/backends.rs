//! Registry of extraction backends for binary document formats.

use docmark_core::{Error, FileType, Partition, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// File types that need an extraction backend. Markdown is decoded directly.
pub const BACKEND_FILE_TYPES: [FileType; 3] = [FileType::Pdf, FileType::Docx, FileType::Pptx];

/// One extraction backend per binary document format.
#[derive(Clone)]
pub struct Backends {
    backends: HashMap<FileType, Arc<dyn Partition>>,
}

impl Backends {
    pub fn builder() -> BackendsBuilder {
        BackendsBuilder::default()
    }

    /// The backends compiled into this build.
    ///
    /// Fails with [`Error::BackendUnavailable`] when a backend's cargo
    /// feature is disabled.
    pub fn builtin() -> Result<Self> {
        #[allow(unused_mut)]
        let mut builder = Self::builder();

        #[cfg(feature = "pdf")]
        {
            builder = builder.register(Arc::new(docmark_pdf::PdfParser::new()));
        }
        #[cfg(feature = "docx")]
        {
            builder = builder.register(Arc::new(docmark_docx::DocxParser::new()));
        }
        #[cfg(feature = "pptx")]
        {
            builder = builder.register(Arc::new(docmark_pptx::PptxParser::new()));
        }

        builder.build()
    }

    /// The backend for a file type.
    pub fn get(&self, file_type: FileType) -> Result<&dyn Partition> {
        self.backends
            .get(&file_type)
            .map(|backend| &**backend)
            .ok_or(Error::BackendUnavailable(file_type))
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("file_types", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects backends and checks that every binary format is covered.
#[derive(Default)]
pub struct BackendsBuilder {
    backends: HashMap<FileType, Arc<dyn Partition>>,
}

impl BackendsBuilder {
    /// Register a backend for the file type it reports, replacing any
    /// backend registered earlier for that type.
    pub fn register(mut self, backend: Arc<dyn Partition>) -> Self {
        self.backends.insert(backend.file_type(), backend);
        self
    }

    pub fn build(self) -> Result<Backends> {
        if let Some(missing) = BACKEND_FILE_TYPES
            .iter()
            .find(|file_type| !self.backends.contains_key(*file_type))
        {
            return Err(Error::BackendUnavailable(*missing));
        }

        Ok(Backends {
            backends: self.backends,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmark_core::{DocumentElement, ReadSeek};

    struct Fixed(FileType);

    impl Partition for Fixed {
        fn file_type(&self) -> FileType {
            self.0
        }

        fn partition(&self, _reader: &mut dyn ReadSeek) -> Result<Vec<DocumentElement>> {
            Ok(vec![DocumentElement::text(self.0.label())])
        }
    }

    #[test]
    #[cfg(all(feature = "pdf", feature = "docx", feature = "pptx"))]
    fn test_builtin_has_all_backends() {
        let backends = Backends::builtin().unwrap();
        for file_type in BACKEND_FILE_TYPES {
            assert_eq!(backends.get(file_type).unwrap().file_type(), file_type);
        }
    }

    #[test]
    fn test_missing_backend() {
        let err = Backends::builder()
            .register(Arc::new(Fixed(FileType::Pdf)))
            .register(Arc::new(Fixed(FileType::Docx)))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::BackendUnavailable(FileType::Pptx)));
    }

    #[test]
    fn test_no_backend_for_markdown() {
        let backends = Backends::builder()
            .register(Arc::new(Fixed(FileType::Pdf)))
            .register(Arc::new(Fixed(FileType::Docx)))
            .register(Arc::new(Fixed(FileType::Pptx)))
            .build()
            .unwrap();

        assert!(backends.get(FileType::Markdown).is_err());
    }
}
