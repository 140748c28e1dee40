//! In-memory engine for tests
//!
//! Documents are plain text: a `%FAKE-PDF` header, optional `#key value`
//! property lines, then one line per page holding the page's label.

use crate::engine::{
    check_page_span, CompressionProfile, EngineError, EngineResult, Metadata, PdfAConformance,
    PdfALevel, PdfEngine, RenderProfile,
};
use std::collections::BTreeMap;

const HEADER: &str = "%FAKE-PDF";

/// Engine whose documents are lists of page labels
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    failing_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeDocument {
    pub properties: BTreeMap<String, String>,
    pub pages: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeAssembly {
    pages: Vec<String>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any append or render touching a page with this label fail.
    pub fn failing_on(mut self, label: &str) -> Self {
        self.failing_label = Some(label.to_string());
        self
    }

    /// Serialize a document with the given page labels.
    pub fn document(pages: &[&str]) -> Vec<u8> {
        Self::document_with(&[], pages)
    }

    /// Serialize a document with properties (`title`, `author`, `pdfa`, ...).
    pub fn document_with(properties: &[(&str, &str)], pages: &[&str]) -> Vec<u8> {
        let document = FakeDocument {
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            pages: pages.iter().map(|p| p.to_string()).collect(),
        };
        serialize(&document)
    }

    /// A document whose pages are labelled `{prefix}{n}`.
    pub fn numbered(prefix: &str, count: usize) -> Vec<u8> {
        let labels: Vec<String> = (1..=count).map(|n| format!("{prefix}{n}")).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        Self::document(&labels)
    }

    /// Page labels of a serialized document.
    pub fn pages_of(bytes: &[u8]) -> Vec<String> {
        parse(bytes).map(|doc| doc.pages).unwrap_or_default()
    }

    /// Properties of a serialized document.
    pub fn properties_of(bytes: &[u8]) -> BTreeMap<String, String> {
        parse(bytes).map(|doc| doc.properties).unwrap_or_default()
    }

    fn check_label(&self, label: &str) -> Option<String> {
        match &self.failing_label {
            Some(failing) if failing == label => Some(format!("page '{label}' is damaged")),
            _ => None,
        }
    }
}

fn serialize(document: &FakeDocument) -> Vec<u8> {
    let mut text = String::from(HEADER);
    text.push('\n');
    for (key, value) in &document.properties {
        text.push_str(&format!("#{key} {value}\n"));
    }
    for page in &document.pages {
        text.push_str(page);
        text.push('\n');
    }
    text.into_bytes()
}

fn parse(bytes: &[u8]) -> EngineResult<FakeDocument> {
    let text = std::str::from_utf8(bytes).map_err(|e| EngineError::Open(e.to_string()))?;
    let mut lines = text.lines();
    if lines.next() != Some(HEADER) {
        return Err(EngineError::Open("missing %FAKE-PDF header".to_string()));
    }

    let mut document = FakeDocument::default();
    for line in lines {
        match line.strip_prefix('#') {
            Some(property) => {
                let (key, value) = property.split_once(' ').unwrap_or((property, ""));
                document
                    .properties
                    .insert(key.to_string(), value.to_string());
            }
            None => document.pages.push(line.to_string()),
        }
    }
    Ok(document)
}

impl PdfEngine for FakeEngine {
    type Document = FakeDocument;
    type Assembly = FakeAssembly;

    fn name(&self) -> &'static str {
        "fake"
    }

    fn open(&self, bytes: &[u8]) -> EngineResult<FakeDocument> {
        parse(bytes)
    }

    fn page_count(&self, document: &FakeDocument) -> usize {
        document.pages.len()
    }

    fn new_assembly(&self) -> FakeAssembly {
        FakeAssembly::default()
    }

    fn append_pages(
        &self,
        assembly: &mut FakeAssembly,
        document: &FakeDocument,
        start: usize,
        end: usize,
    ) -> EngineResult<()> {
        check_page_span(start, end, document.pages.len())?;
        let pages = &document.pages[start - 1..end];
        if let Some(detail) = pages.iter().find_map(|label| self.check_label(label)) {
            return Err(EngineError::Assembly(detail));
        }
        assembly.pages.extend(pages.iter().cloned());
        Ok(())
    }

    fn assemble(&self, assembly: FakeAssembly) -> EngineResult<Vec<u8>> {
        Ok(serialize(&FakeDocument {
            properties: BTreeMap::new(),
            pages: assembly.pages,
        }))
    }

    fn render(
        &self,
        document: &FakeDocument,
        page: usize,
        profile: &RenderProfile,
    ) -> EngineResult<Vec<u8>> {
        check_page_span(page, page, document.pages.len())?;
        let label = &document.pages[page - 1];
        if let Some(detail) = self.check_label(label) {
            return Err(EngineError::Render(detail));
        }
        Ok(format!(
            "IMAGE {} {} {}dpi {:?}",
            profile.format, label, profile.dpi, profile.intent
        )
        .into_bytes())
    }

    fn optimize(
        &self,
        document: &FakeDocument,
        profile: &CompressionProfile,
    ) -> EngineResult<Vec<u8>> {
        let mut optimized = FakeDocument {
            properties: BTreeMap::new(),
            pages: document.pages.clone(),
        };
        optimized
            .properties
            .insert("optimized".to_string(), profile.name().to_string());
        Ok(serialize(&optimized))
    }

    fn convert_to_pdfa(
        &self,
        document: &FakeDocument,
        level: PdfALevel,
    ) -> EngineResult<Vec<u8>> {
        let mut converted = document.clone();
        converted.properties.insert(
            "pdfa".to_string(),
            format!("{}{}", level.part(), level.conformance()),
        );
        Ok(serialize(&converted))
    }

    fn extract_text(&self, document: &FakeDocument, page: usize) -> EngineResult<String> {
        check_page_span(page, page, document.pages.len())?;
        Ok(document.pages[page - 1].clone())
    }

    fn read_metadata(&self, document: &FakeDocument) -> EngineResult<Metadata> {
        let property = |key: &str| document.properties.get(key).cloned();
        let flag = |key: &str| property(key).as_deref() == Some("true");

        let pdfa = property("pdfa").and_then(|declared| {
            let mut chars = declared.chars();
            let part = chars.next()?.to_digit(10)? as u8;
            Some(PdfAConformance {
                part,
                conformance: chars.next(),
            })
        });

        Ok(Metadata {
            title: property("title"),
            author: property("author"),
            subject: property("subject"),
            keywords: property("keywords"),
            creator: property("creator"),
            producer: property("producer"),
            creation_date: property("created"),
            modification_date: property("modified"),
            pdf_version: property("version").unwrap_or_else(|| "1.7".to_string()),
            page_count: document.pages.len(),
            encrypted: flag("encrypted"),
            linearized: flag("linearized"),
            has_forms: flag("forms"),
            tagged: flag("tagged"),
            pdfa,
        })
    }
}
