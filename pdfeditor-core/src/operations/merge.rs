//! PDF merging
//!
//! Concatenates every page of several documents, in input order, into one
//! new document.

use crate::artifact::OutputArtifact;
use crate::document::SourceDocument;
use crate::engine::PdfEngine;
use crate::error::{EditorError, Result};
use crate::naming::OutputNamer;
use crate::workspace::Workspace;
use std::path::PathBuf;
use tracing::{debug, info};

/// Minimum number of inputs for a merge
pub const MIN_MERGE_INPUTS: usize = 2;

/// Input for a merge operation
#[derive(Debug, Clone)]
pub struct MergeInput {
    /// Staged file to read
    pub path: PathBuf,
    /// Name shown in logs and errors
    pub label: String,
}

impl MergeInput {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// Options for PDF merging
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Output file name; `.pdf` is appended when missing
    pub output_name: Option<String>,
}

/// Fail early when fewer than two documents are given.
pub fn ensure_enough_inputs(provided: usize) -> Result<()> {
    if provided < MIN_MERGE_INPUTS {
        return Err(EditorError::InsufficientInputs {
            required: MIN_MERGE_INPUTS,
            provided,
        });
    }
    Ok(())
}

/// PDF merger
pub struct PdfMerger<'e, E: PdfEngine> {
    engine: &'e E,
    inputs: Vec<MergeInput>,
    options: MergeOptions,
}

impl<'e, E: PdfEngine> PdfMerger<'e, E> {
    pub fn new(engine: &'e E, options: MergeOptions) -> Self {
        Self {
            engine,
            inputs: Vec::new(),
            options,
        }
    }

    pub fn add_input(&mut self, input: MergeInput) {
        self.inputs.push(input);
    }

    /// Merge all inputs into one artifact.
    ///
    /// Each source is opened, appended and released before the next one is
    /// opened. The artifact is only written once assembly succeeded.
    pub fn merge(&self, workspace: &Workspace) -> Result<OutputArtifact> {
        ensure_enough_inputs(self.inputs.len())?;
        info!("Merging {} documents", self.inputs.len());

        let mut assembly = self.engine.new_assembly();
        for (index, input) in self.inputs.iter().enumerate() {
            let failure = |detail: String| EditorError::AssemblyFailure {
                segment: format!("input {} ({})", index + 1, input.label),
                detail,
                produced: Vec::new(),
            };

            let source = SourceDocument::open(self.engine, &input.path)
                .map_err(|e| failure(e.to_string()))?;
            if source.page_count() == 0 {
                return Err(failure("document has no pages".to_string()));
            }
            source
                .append_all(&mut assembly)
                .map_err(|e| failure(e.to_string()))?;
            debug!("Appended {} pages from {}", source.page_count(), input.label);
        }

        let bytes = self
            .engine
            .assemble(assembly)
            .map_err(|e| EditorError::AssemblyFailure {
                segment: "merged document".to_string(),
                detail: e.to_string(),
                produced: Vec::new(),
            })?;

        let name = OutputNamer::new(self.options.output_name.as_deref(), "merged").pdf();
        let artifact = workspace.write_output(&name, &bytes)?;
        info!("Merged document written to {}", artifact.file_name);
        Ok(artifact)
    }
}

/// Merge `inputs` into the output area of `workspace`.
pub fn merge_pdfs<E: PdfEngine>(
    engine: &E,
    workspace: &Workspace,
    inputs: Vec<MergeInput>,
    options: MergeOptions,
) -> Result<OutputArtifact> {
    let mut merger = PdfMerger::new(engine, options);
    for input in inputs {
        merger.add_input(input);
    }
    merger.merge(workspace)
}
