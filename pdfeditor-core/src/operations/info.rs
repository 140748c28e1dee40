//! Document information

use crate::document::SourceDocument;
use crate::engine::{parse_pdf_date, PdfEngine};
use crate::error::Result;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub modification_date: Option<DateTime<FixedOffset>>,
    pub pdf_version: String,
    pub page_count: usize,
    pub file_size: u64,
    pub encrypted: bool,
    pub linearized: bool,
    pub has_forms: bool,
    pub tagged: bool,
    pub pdfa_conformance: Option<String>,
}

/// Collect the document information of `source`.
pub fn read_info<E: PdfEngine>(source: &SourceDocument<'_, E>, file_size: u64) -> Result<DocumentInfo> {
    let metadata = source.engine().read_metadata(source.handle())?;
    debug!("Read metadata of {}: {:?}", source.label(), metadata);

    Ok(DocumentInfo {
        creation_date: metadata.creation_date.as_deref().and_then(parse_pdf_date),
        modification_date: metadata
            .modification_date
            .as_deref()
            .and_then(parse_pdf_date),
        pdfa_conformance: metadata.pdfa.map(|c| c.to_string()),
        title: metadata.title,
        author: metadata.author,
        subject: metadata.subject,
        keywords: metadata.keywords,
        creator: metadata.creator,
        producer: metadata.producer,
        pdf_version: metadata.pdf_version,
        page_count: metadata.page_count,
        file_size,
        encrypted: metadata.encrypted,
        linearized: metadata.linearized,
        has_forms: metadata.has_forms,
        tagged: metadata.tagged,
    })
}
