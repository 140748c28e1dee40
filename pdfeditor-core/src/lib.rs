//! # pdfeditor
//!
//! Document assembly core of the PDF editor service: page selection, split,
//! merge, page rendering and the file lifecycle around them.
//!
//! ## Features
//!
//! - **Page specifications**: lenient page selections (`"1,3,5-7"`) and strict
//!   split ranges
//! - **Split**: by explicit ranges or by boundary pages
//! - **Merge**: concatenate documents in order
//! - **Convert**: render pages to PNG, JPEG or TIFF (`pdfium` feature)
//! - **Compress, PDF/A, text and metadata**: supporting document operations
//! - **File lifecycle**: staged uploads are always removed, outputs are
//!   written atomically
//!
//! All PDF work goes through the [`PdfEngine`] trait. [`LopdfEngine`] is the
//! pure Rust backend.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfeditor::{EngineConfig, LopdfEngine, PdfEditor, SplitRequest, Upload, Workspace};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = LopdfEngine::initialize(&EngineConfig::default())?;
//! let workspace = Workspace::new("./uploads", "./output")?;
//! let editor = PdfEditor::new(Arc::new(engine), workspace);
//!
//! let upload = Upload::new("report.pdf", std::fs::read("report.pdf")?);
//! let parts = editor.split(
//!     &upload,
//!     &SplitRequest {
//!         mode: "ranges".to_string(),
//!         points: vec!["1-3".to_string(), "4-10".to_string()],
//!         output_base: Some("report".to_string()),
//!     },
//! )?;
//! for part in parts {
//!     println!("{} ({} bytes)", part.file_name, part.file_size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod document;
pub mod editor;
pub mod engine;
pub mod error;
pub mod naming;
pub mod operations;
pub mod page_spec;
pub mod workspace;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use artifact::OutputArtifact;
pub use document::SourceDocument;
pub use editor::{ConvertRequest, CompressRequest, PdfARequest, PdfEditor, SplitRequest, Upload};
pub use engine::{
    CompressionProfile, EngineConfig, EngineError, ImageFormat, LopdfEngine, PdfALevel, PdfEngine,
    RenderProfile,
};
pub use error::{EditorError, Result};
pub use operations::{
    DocumentInfo, ExtractionReport, PageText, PdfAValidationReport, SplitMode, ValidationIssue,
};
pub use page_spec::{select_pages, PageSpan};
pub use workspace::Workspace;

/// Current version of pdfeditor
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
