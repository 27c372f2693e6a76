/*!
 * Structured documents.
 *
 * Every supported format exposes the same capability: an arena `Layout`
 * that can be walked into translation units, written back into, and
 * serialized to bytes. `Document` dispatches over the concrete formats.
 */

pub mod docx;
pub mod model;
pub mod pdf;
pub mod redistribute;
pub mod walker;

use std::path::Path;

use crate::errors::{ExtractionError, PersistenceError};

pub use docx::DocxDocument;
pub use model::{ContainerKind, Layout, Run, RunId, RunStyle};
pub use pdf::PdfDocument;
pub use walker::{RunRef, TranslationUnit, WalkerConfig};

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from magic bytes, falling back to the file extension
    pub fn detect(bytes: &[u8], file_name: &str) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }
        if bytes.starts_with(b"PK\x03\x04") {
            return Some(Self::Docx);
        }
        let extension = Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        match extension.as_deref() {
            Some("pdf") => Some(Self::Pdf),
            Some("docx") => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }
}

/// Options applied when opening a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Merge PDF text blocks into logical paragraphs
    pub merge_pdf_blocks: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { merge_pdf_blocks: true }
    }
}

/// Capability shared by all document formats
pub trait StructuredDocument {
    fn format(&self) -> DocumentFormat;

    fn layout(&self) -> &Layout;

    fn layout_mut(&mut self) -> &mut Layout;

    /// Serialize the document with its current run texts
    fn serialize(&self) -> Result<Vec<u8>, PersistenceError>;

    /// Translation units in canonical order
    fn extract(&self, config: &WalkerConfig) -> Vec<TranslationUnit> {
        walker::extract(self.layout(), config)
    }

    /// Write one unit's translation back into its runs
    fn apply(&mut self, unit: &TranslationUnit, translated: &str) {
        redistribute::apply(self.layout_mut(), unit, translated);
    }
}

impl StructuredDocument for DocxDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn layout(&self) -> &Layout {
        DocxDocument::layout(self)
    }

    fn layout_mut(&mut self) -> &mut Layout {
        DocxDocument::layout_mut(self)
    }

    fn serialize(&self) -> Result<Vec<u8>, PersistenceError> {
        self.to_bytes()
    }
}

impl StructuredDocument for PdfDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn layout(&self) -> &Layout {
        PdfDocument::layout(self)
    }

    fn layout_mut(&mut self) -> &mut Layout {
        PdfDocument::layout_mut(self)
    }

    fn serialize(&self) -> Result<Vec<u8>, PersistenceError> {
        self.to_bytes()
    }
}

/// An opened document of any supported format
#[derive(Debug, Clone)]
pub enum Document {
    Docx(DocxDocument),
    Pdf(PdfDocument),
}

impl Document {
    /// Open a document from bytes with default options
    pub fn open(bytes: &[u8], file_name: &str) -> Result<Self, ExtractionError> {
        Self::open_with(bytes, file_name, &OpenOptions::default())
    }

    pub fn open_with(bytes: &[u8], file_name: &str, options: &OpenOptions) -> Result<Self, ExtractionError> {
        match DocumentFormat::detect(bytes, file_name) {
            Some(DocumentFormat::Docx) => Ok(Self::Docx(DocxDocument::from_bytes(bytes)?)),
            Some(DocumentFormat::Pdf) => Ok(Self::Pdf(PdfDocument::from_bytes(bytes, options.merge_pdf_blocks)?)),
            None => Err(ExtractionError::UnsupportedFormat(file_name.to_string())),
        }
    }

    fn inner(&self) -> &dyn StructuredDocument {
        match self {
            Self::Docx(doc) => doc,
            Self::Pdf(doc) => doc,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn StructuredDocument {
        match self {
            Self::Docx(doc) => doc,
            Self::Pdf(doc) => doc,
        }
    }
}

impl StructuredDocument for Document {
    fn format(&self) -> DocumentFormat {
        self.inner().format()
    }

    fn layout(&self) -> &Layout {
        self.inner().layout()
    }

    fn layout_mut(&mut self) -> &mut Layout {
        self.inner_mut().layout_mut()
    }

    fn serialize(&self) -> Result<Vec<u8>, PersistenceError> {
        self.inner().serialize()
    }
}
