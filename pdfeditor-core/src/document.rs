//! Opened source documents

use crate::engine::{EngineResult, PdfEngine};
use crate::error::{EditorError, Result};
use crate::page_spec::PageSpan;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A document opened through an engine for the duration of one operation.
///
/// The engine handle is released when this value is dropped.
pub struct SourceDocument<'e, E: PdfEngine> {
    engine: &'e E,
    handle: E::Document,
    page_count: usize,
    label: String,
}

impl<'e, E: PdfEngine> SourceDocument<'e, E> {
    /// Read and open a staged file.
    pub fn open(engine: &'e E, path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .map_err(|e| EditorError::storage(format!("reading {}", path.display()), e))?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(engine, &bytes, label)
    }

    pub fn from_bytes(engine: &'e E, bytes: &[u8], label: impl Into<String>) -> Result<Self> {
        let handle = engine.open(bytes)?;
        let page_count = engine.page_count(&handle);
        let label = label.into();
        debug!("Opened {} ({} pages) with {}", label, page_count, engine.name());
        Ok(Self {
            engine,
            handle,
            page_count,
            label,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn engine(&self) -> &'e E {
        self.engine
    }

    pub fn handle(&self) -> &E::Document {
        &self.handle
    }

    /// Build a standalone document from one run of pages.
    pub fn extract(&self, span: PageSpan) -> EngineResult<Vec<u8>> {
        let mut assembly = self.engine.new_assembly();
        self.engine
            .append_pages(&mut assembly, &self.handle, span.start, span.end)?;
        self.engine.assemble(assembly)
    }

    /// Append every page to an assembly under construction.
    pub fn append_all(&self, assembly: &mut E::Assembly) -> EngineResult<()> {
        self.engine
            .append_pages(assembly, &self.handle, 1, self.page_count)
    }
}
