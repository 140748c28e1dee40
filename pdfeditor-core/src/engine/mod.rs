//! Document engine abstraction
//!
//! Every PDF capability the editor needs goes through [`PdfEngine`]. The
//! shipped backend is [`LopdfEngine`]; tests substitute an in-memory engine.

mod lopdf_engine;
pub mod metadata;
pub mod profile;
#[cfg(feature = "pdfium")]
mod raster;

pub use lopdf_engine::{LopdfAssembly, LopdfDocument, LopdfEngine};
pub use metadata::{parse_pdf_date, Metadata, PdfAConformance};
pub use profile::{CompressionProfile, ImageFormat, PdfALevel, RenderIntent, RenderProfile};

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by an engine backend
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to open document: {0}")]
    Open(String),

    #[error("Page {page} does not exist (document has {page_count} pages)")]
    InvalidPage { page: usize, page_count: usize },

    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Optimization failed: {0}")]
    Optimize(String),

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Metadata unavailable: {0}")]
    Metadata(String),

    #[error("{capability} is not supported by the {engine} engine")]
    Unsupported {
        capability: &'static str,
        engine: &'static str,
    },

    #[error("Engine initialization failed: {0}")]
    Initialization(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Start-up settings for an engine backend
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Directory holding the native rendering library, if any
    pub native_lib_path: Option<PathBuf>,
}

/// A PDF backend.
///
/// Documents and assemblies are opaque handles owned by the caller. An
/// assembly must own everything it needs, so source documents can be
/// dropped as soon as their pages are appended.
pub trait PdfEngine: Send + Sync {
    /// An opened source document
    type Document;
    /// A document under construction
    type Assembly;

    fn name(&self) -> &'static str;

    fn open(&self, bytes: &[u8]) -> EngineResult<Self::Document>;

    fn page_count(&self, document: &Self::Document) -> usize;

    fn new_assembly(&self) -> Self::Assembly;

    /// Append pages `start..=end` (1-based) of `document` to `assembly`
    fn append_pages(
        &self,
        assembly: &mut Self::Assembly,
        document: &Self::Document,
        start: usize,
        end: usize,
    ) -> EngineResult<()>;

    /// Serialize the assembly into a standalone PDF
    fn assemble(&self, assembly: Self::Assembly) -> EngineResult<Vec<u8>>;

    /// Rasterize one 1-based page into encoded image bytes
    fn render(
        &self,
        document: &Self::Document,
        page: usize,
        profile: &RenderProfile,
    ) -> EngineResult<Vec<u8>>;

    fn optimize(
        &self,
        document: &Self::Document,
        profile: &CompressionProfile,
    ) -> EngineResult<Vec<u8>>;

    fn convert_to_pdfa(&self, document: &Self::Document, level: PdfALevel)
        -> EngineResult<Vec<u8>>;

    fn extract_text(&self, document: &Self::Document, page: usize) -> EngineResult<String>;

    fn read_metadata(&self, document: &Self::Document) -> EngineResult<Metadata>;
}

/// Check that `start..=end` is a non-empty run inside a document.
pub fn check_page_span(start: usize, end: usize, page_count: usize) -> EngineResult<()> {
    if start < 1 || start > page_count {
        return Err(EngineError::InvalidPage {
            page: start,
            page_count,
        });
    }
    if end < start || end > page_count {
        return Err(EngineError::InvalidPage {
            page: end,
            page_count,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_page_span() {
        assert!(check_page_span(1, 3, 3).is_ok());
        assert!(check_page_span(2, 2, 3).is_ok());
        assert!(matches!(
            check_page_span(0, 2, 3),
            Err(EngineError::InvalidPage { page: 0, .. })
        ));
        assert!(matches!(
            check_page_span(2, 4, 3),
            Err(EngineError::InvalidPage { page: 4, .. })
        ));
        assert!(matches!(
            check_page_span(3, 2, 3),
            Err(EngineError::InvalidPage { page: 2, .. })
        ));
    }

    #[test]
    fn test_unsupported_message() {
        let error = EngineError::Unsupported {
            capability: "PDF/A conversion",
            engine: "lopdf",
        };
        assert_eq!(
            error.to_string(),
            "PDF/A conversion is not supported by the lopdf engine"
        );
    }
}
