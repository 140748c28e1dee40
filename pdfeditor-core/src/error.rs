use crate::artifact::OutputArtifact;
use crate::engine::EngineError;
use thiserror::Error;

/// Errors surfaced by the document assembly core.
///
/// Every variant is terminal for the current request. Transient files have
/// already been cleaned up by the time the caller sees one of these.
#[derive(Error, Debug)]
pub enum EditorError {
    /// A page specification token could not be parsed
    #[error("Malformed page specification '{token}': {reason}")]
    MalformedPageSpec { token: String, reason: String },

    /// A strict page range or split point falls outside the document
    #[error("Page range '{range}' is out of bounds: page {page} is outside the valid range {lower}-{bound}")]
    PageRangeOutOfBounds {
        range: String,
        page: usize,
        lower: usize,
        bound: usize,
    },

    /// Not enough input documents for the operation
    #[error("At least {required} files are required, got {provided}")]
    InsufficientInputs { required: usize, provided: usize },

    /// Assembling one output segment failed
    #[error("Failed to assemble {segment}: {detail}")]
    AssemblyFailure {
        segment: String,
        detail: String,
        /// Artifacts written before the failing segment, left in place
        produced: Vec<OutputArtifact>,
    },

    /// Rendering one page failed
    #[error("Failed to render page {page}: {detail}")]
    RenderFailure {
        page: usize,
        detail: String,
        /// Images written before the failing page, left in place
        produced: Vec<OutputArtifact>,
    },

    /// Staging or output area could not be read or written
    #[error("Storage error while {context}: {source}")]
    Storage {
        context: String,
        source: std::io::Error,
    },

    #[error("Invalid split mode: '{0}' (expected 'ranges' or 'pages')")]
    InvalidSplitMode(String),

    #[error("Unsupported image format: '{0}' (expected png, jpeg or tiff)")]
    UnsupportedFormat(String),

    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("No file provided for {0}")]
    EmptyUpload(&'static str),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// A download request resolved outside the output directory
    #[error("Requested path escapes the output directory: {0}")]
    PathTraversal(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),
}

pub type Result<T> = std::result::Result<T, EditorError>;

impl EditorError {
    pub(crate) fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        EditorError::Storage {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        EditorError::MalformedPageSpec {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// Artifacts that were produced before a split or convert failed.
    pub fn partial_artifacts(&self) -> &[OutputArtifact] {
        match self {
            EditorError::AssemblyFailure { produced, .. }
            | EditorError::RenderFailure { produced, .. } => produced,
            _ => &[],
        }
    }

    /// Whether the failure was caused by the caller's input rather than the
    /// engine or the filesystem.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EditorError::MalformedPageSpec { .. }
                | EditorError::PageRangeOutOfBounds { .. }
                | EditorError::InsufficientInputs { .. }
                | EditorError::InvalidSplitMode(_)
                | EditorError::UnsupportedFormat(_)
                | EditorError::InvalidParameter { .. }
                | EditorError::EmptyUpload(_)
                | EditorError::PathTraversal(_)
        )
    }
}
