//! PDF operations module
//!
//! Each operation works on documents already opened through a
//! [`PdfEngine`](crate::engine::PdfEngine) and writes its results into a
//! [`Workspace`](crate::workspace::Workspace) output area.

pub mod compress;
pub mod convert;
pub mod extract;
pub mod info;
pub mod merge;
pub mod pdfa;
pub mod split;

pub use compress::{compress_pdf, CompressOptions};
pub use convert::{convert_to_images, ConvertOptions, DEFAULT_DPI, DPI_RANGE};
pub use extract::{extract_text, ExtractionReport, PageText};
pub use info::{read_info, DocumentInfo};
pub use merge::{merge_pdfs, MergeInput, MergeOptions, PdfMerger, MIN_MERGE_INPUTS};
pub use pdfa::{
    convert_to_pdfa, validate_pdfa, PdfAOptions, PdfAValidationReport, Severity, ValidationIssue,
};
pub use split::{plan_split, split_pdf, PdfSplitter, PlannedSegment, SplitMode, SplitOptions};

#[cfg(test)]
mod merge_tests;
#[cfg(test)]
mod split_tests;
