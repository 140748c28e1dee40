//! PDF splitting
//!
//! A split turns one document into several, either from explicit page
//! ranges or from a list of boundary pages.

use crate::artifact::OutputArtifact;
use crate::document::SourceDocument;
use crate::engine::PdfEngine;
use crate::error::{EditorError, Result};
use crate::naming::OutputNamer;
use crate::page_spec::{parse_page_number, parse_range, PageSpan};
use crate::workspace::Workspace;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// How split points are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// Each point is a `start-end` range producing one document
    Ranges,
    /// Each point is the first page of a new document
    Pages,
}

impl FromStr for SplitMode {
    type Err = EditorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ranges" => Ok(SplitMode::Ranges),
            "pages" => Ok(SplitMode::Pages),
            _ => Err(EditorError::InvalidSplitMode(s.trim().to_string())),
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitMode::Ranges => "ranges",
            SplitMode::Pages => "pages",
        })
    }
}

/// Options for PDF splitting
#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub mode: SplitMode,
    /// Ranges or boundary pages, depending on `mode`
    pub points: Vec<String>,
    /// Base of the output names; a random one is used when absent
    pub base_name: Option<String>,
}

/// One planned output document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSegment {
    /// Position used in the output name
    pub part: usize,
    pub span: PageSpan,
}

/// Validate the points and derive the segments to write.
///
/// Nothing is written until the whole plan is known to be valid.
pub fn plan_split(
    mode: SplitMode,
    points: &[String],
    total_pages: usize,
) -> Result<Vec<PlannedSegment>> {
    match mode {
        SplitMode::Ranges => {
            if points.is_empty() {
                return Err(EditorError::malformed("", "no page ranges given"));
            }
            points
                .iter()
                .enumerate()
                .map(|(index, point)| {
                    Ok(PlannedSegment {
                        part: index + 1,
                        span: parse_range(point, total_pages)?,
                    })
                })
                .collect()
        }
        SplitMode::Pages => {
            let mut boundaries = Vec::with_capacity(points.len() + 2);
            boundaries.push(1);
            for point in points {
                let page = parse_page_number(point)?;
                if page < 1 || page > total_pages {
                    return Err(EditorError::PageRangeOutOfBounds {
                        range: point.trim().to_string(),
                        page,
                        lower: 1,
                        bound: total_pages,
                    });
                }
                boundaries.push(page);
            }
            boundaries.push(total_pages + 1);

            let mut segments = Vec::new();
            for (index, pair) in boundaries.windows(2).enumerate() {
                let (start, next) = (pair[0], pair[1]);
                if next <= start {
                    debug!("Skipping empty segment between boundaries {} and {}", start, next);
                    continue;
                }
                segments.push(PlannedSegment {
                    part: index + 1,
                    span: PageSpan::new(start, next - 1),
                });
            }
            Ok(segments)
        }
    }
}

/// PDF splitter
pub struct PdfSplitter<'a, 'e, E: PdfEngine> {
    source: &'a SourceDocument<'e, E>,
    options: SplitOptions,
}

impl<'a, 'e, E: PdfEngine> PdfSplitter<'a, 'e, E> {
    pub fn new(source: &'a SourceDocument<'e, E>, options: SplitOptions) -> Self {
        Self { source, options }
    }

    /// Split the document, writing one artifact per segment.
    ///
    /// A failing segment stops the split; artifacts written before it are
    /// kept and reported in the error.
    pub fn split(&self, workspace: &Workspace) -> Result<Vec<OutputArtifact>> {
        let plan = plan_split(
            self.options.mode,
            &self.options.points,
            self.source.page_count(),
        )?;
        let namer = OutputNamer::new(self.options.base_name.as_deref(), "split");
        info!(
            "Splitting {} ({} pages) into {} documents by {}",
            self.source.label(),
            self.source.page_count(),
            plan.len(),
            self.options.mode
        );

        let mut produced = Vec::with_capacity(plan.len());
        for segment in plan {
            let file_name = namer.split_part(segment.part, segment.span);
            let written = self
                .source
                .extract(segment.span)
                .map_err(EditorError::from)
                .and_then(|bytes| workspace.write_output(&file_name, &bytes));

            match written {
                Ok(artifact) => {
                    debug!("Wrote pages {} to {}", segment.span, file_name);
                    produced.push(artifact);
                }
                Err(e) => {
                    return Err(EditorError::AssemblyFailure {
                        segment: format!("pages {}", segment.span),
                        detail: e.to_string(),
                        produced,
                    })
                }
            }
        }

        Ok(produced)
    }
}

/// Split `source` into the output area of `workspace`.
pub fn split_pdf<E: PdfEngine>(
    source: &SourceDocument<'_, E>,
    workspace: &Workspace,
    options: SplitOptions,
) -> Result<Vec<OutputArtifact>> {
    PdfSplitter::new(source, options).split(workspace)
}
