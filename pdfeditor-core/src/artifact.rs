//! Output artifacts produced by the engines

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file written to the caller-visible output area.
///
/// Artifacts outlive the request that created them; their retention is
/// managed outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputArtifact {
    /// File name inside the output directory
    pub file_name: String,
    /// Absolute path of the file
    pub file_path: PathBuf,
    /// Size in bytes
    pub file_size: u64,
    /// Size of the input document, for size-reducing operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    /// Size reduction in percent, derived from `original_size`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
}

impl OutputArtifact {
    pub fn new(file_name: impl Into<String>, file_path: PathBuf, file_size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            file_path,
            file_size,
            original_size: None,
            compression_ratio: None,
        }
    }

    /// Record the input size; the compression ratio follows from it.
    pub fn with_original_size(mut self, original_size: u64) -> Self {
        self.original_size = Some(original_size);
        self.compression_ratio = Some(compression_ratio(original_size, self.file_size));
        self
    }
}

/// Percentage saved going from `original` to `compressed` bytes.
///
/// Negative when the output grew. An empty original yields 0.
pub fn compression_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}
