//! Pure Rust engine backed by lopdf

use super::metadata::{Metadata, PdfAConformance};
use super::profile::{CompressionProfile, PdfALevel, RenderProfile};
use super::{check_page_span, EngineConfig, EngineError, EngineResult, PdfEngine};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[cfg(feature = "pdfium")]
use super::raster::Rasterizer;

const ENGINE_NAME: &str = "lopdf";

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in damaged files
const MAX_TREE_DEPTH: usize = 64;

/// lopdf backend.
///
/// Assembly, optimization, text and metadata work in pure Rust. Page
/// rendering needs the `pdfium` feature and a native pdfium library.
#[derive(Default)]
pub struct LopdfEngine {
    #[cfg(feature = "pdfium")]
    rasterizer: Option<Rasterizer>,
}

/// An opened document
pub struct LopdfDocument {
    document: Document,
    #[cfg(feature = "pdfium")]
    bytes: Vec<u8>,
}

impl LopdfDocument {
    pub fn inner(&self) -> &Document {
        &self.document
    }
}

/// Page runs collected for a new document
#[derive(Default)]
pub struct LopdfAssembly {
    parts: Vec<Document>,
}

impl LopdfEngine {
    /// Prepare the engine once at start-up.
    pub fn initialize(config: &EngineConfig) -> EngineResult<Self> {
        #[cfg(feature = "pdfium")]
        {
            let rasterizer = Rasterizer::bind(config.native_lib_path.clone())?;
            info!("lopdf engine initialized with pdfium rendering");
            Ok(Self {
                rasterizer: Some(rasterizer),
            })
        }

        #[cfg(not(feature = "pdfium"))]
        {
            if let Some(path) = &config.native_lib_path {
                tracing::warn!(
                    "Rendering support not compiled in, ignoring native library at {}",
                    path.display()
                );
            }
            info!("lopdf engine initialized without rendering support");
            Ok(Self::default())
        }
    }
}

impl PdfEngine for LopdfEngine {
    type Document = LopdfDocument;
    type Assembly = LopdfAssembly;

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn open(&self, bytes: &[u8]) -> EngineResult<LopdfDocument> {
        let document = Document::load_mem(bytes).map_err(|e| EngineError::Open(e.to_string()))?;
        debug!(
            "Opened PDF {} with {} pages",
            document.version,
            document.get_pages().len()
        );
        Ok(LopdfDocument {
            document,
            #[cfg(feature = "pdfium")]
            bytes: bytes.to_vec(),
        })
    }

    fn page_count(&self, document: &LopdfDocument) -> usize {
        document.document.get_pages().len()
    }

    fn new_assembly(&self) -> LopdfAssembly {
        LopdfAssembly::default()
    }

    fn append_pages(
        &self,
        assembly: &mut LopdfAssembly,
        document: &LopdfDocument,
        start: usize,
        end: usize,
    ) -> EngineResult<()> {
        let page_count = self.page_count(document);
        check_page_span(start, end, page_count)?;

        let mut part = document.document.clone();
        flatten_inherited_attributes(&mut part);

        let unwanted: Vec<u32> = (1..=page_count)
            .filter(|page| *page < start || *page > end)
            .map(|page| page as u32)
            .collect();
        if !unwanted.is_empty() {
            part.delete_pages(&unwanted);
        }
        part.prune_objects();

        assembly.parts.push(part);
        Ok(())
    }

    fn assemble(&self, assembly: LopdfAssembly) -> EngineResult<Vec<u8>> {
        if assembly.parts.is_empty() {
            return Err(EngineError::Assembly("no pages to assemble".to_string()));
        }

        let version = assembly
            .parts
            .iter()
            .map(|part| part.version.clone())
            .max()
            .unwrap_or_else(|| "1.7".to_string());

        let mut max_id = 1;
        let mut page_ids: Vec<ObjectId> = Vec::new();
        let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

        for mut part in assembly.parts {
            part.renumber_objects_with(max_id);
            max_id = part.max_id + 1;
            page_ids.extend(part.get_pages().into_values());
            objects.extend(part.objects);
        }

        let mut merged = Document::with_version(version);
        merged.objects.extend(objects);
        merged.max_id = max_id - 1;

        let pages_id = merged.new_object_id();
        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(page_ids.len() as i64));
        pages.set("Kids", Object::Array(kids));

        let catalog_id = merged.new_object_id();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));

        merged.objects.insert(pages_id, Object::Dictionary(pages));
        merged.objects.insert(catalog_id, Object::Dictionary(catalog));
        merged.trailer.set("Root", Object::Reference(catalog_id));

        for &page_id in &page_ids {
            if let Ok(Object::Dictionary(page)) = merged.get_object_mut(page_id) {
                page.set("Parent", Object::Reference(pages_id));
            }
        }

        // Old catalogs and page trees are unreachable from the new root
        merged.prune_objects();
        merged.compress();

        debug!("Assembled {} pages", page_ids.len());
        save(&mut merged).map_err(EngineError::Assembly)
    }

    #[cfg_attr(not(feature = "pdfium"), allow(unused_variables))]
    fn render(
        &self,
        document: &LopdfDocument,
        page: usize,
        profile: &RenderProfile,
    ) -> EngineResult<Vec<u8>> {
        check_page_span(page, page, self.page_count(document))?;

        #[cfg(feature = "pdfium")]
        if let Some(rasterizer) = &self.rasterizer {
            return rasterizer.render(&document.bytes, page, profile);
        }

        Err(EngineError::Unsupported {
            capability: "Page rendering",
            engine: ENGINE_NAME,
        })
    }

    fn optimize(
        &self,
        document: &LopdfDocument,
        profile: &CompressionProfile,
    ) -> EngineResult<Vec<u8>> {
        let mut optimized = document.document.clone();

        match profile {
            CompressionProfile::Print => {}
            CompressionProfile::Web | CompressionProfile::Custom { .. } => {
                let pruned = optimized.prune_objects();
                let empty = optimized.delete_zero_length_streams();
                debug!(
                    "Removed {} unreachable objects and {} empty streams",
                    pruned.len(),
                    empty.len()
                );
            }
        }
        if let CompressionProfile::Custom {
            image_quality: Some(quality),
        } = profile
        {
            // Image streams are kept as-is; lopdf cannot re-encode them
            debug!("Requested image quality {} left to stream compression", quality);
        }

        optimized.compress();
        if !matches!(profile, CompressionProfile::Print) {
            optimized.renumber_objects();
        }

        save(&mut optimized).map_err(EngineError::Optimize)
    }

    fn convert_to_pdfa(
        &self,
        _document: &LopdfDocument,
        _level: PdfALevel,
    ) -> EngineResult<Vec<u8>> {
        Err(EngineError::Unsupported {
            capability: "PDF/A conversion",
            engine: ENGINE_NAME,
        })
    }

    fn extract_text(&self, document: &LopdfDocument, page: usize) -> EngineResult<String> {
        check_page_span(page, page, self.page_count(document))?;
        document
            .document
            .extract_text(&[page as u32])
            .map_err(|e| EngineError::Extraction(e.to_string()))
    }

    fn read_metadata(&self, document: &LopdfDocument) -> EngineResult<Metadata> {
        let doc = &document.document;
        let info = info_dictionary(doc);
        let text = |key: &[u8]| {
            info.and_then(|dict| dict.get(key).ok())
                .and_then(|value| resolve(doc, value))
                .and_then(decode_text)
        };

        let catalog = doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .map_err(|e| EngineError::Metadata(format!("missing document catalog: {e}")))?;

        Ok(Metadata {
            title: text(b"Title"),
            author: text(b"Author"),
            subject: text(b"Subject"),
            keywords: text(b"Keywords"),
            creator: text(b"Creator"),
            producer: text(b"Producer"),
            creation_date: text(b"CreationDate"),
            modification_date: text(b"ModDate"),
            pdf_version: doc.version.clone(),
            page_count: doc.get_pages().len(),
            encrypted: doc.trailer.has(b"Encrypt"),
            linearized: is_linearized(doc),
            has_forms: catalog.has(b"AcroForm"),
            tagged: is_tagged(doc, catalog),
            pdfa: xmp_packet(doc, catalog).and_then(|xmp| PdfAConformance::from_xmp(&xmp)),
        })
    }
}

fn save(document: &mut Document) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .map_err(|e| format!("save failed: {e}"))?;
    Ok(buffer)
}

/// Copy inherited attributes onto every page so pages survive being moved
/// under a new page tree.
fn flatten_inherited_attributes(document: &mut Document) {
    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();

    for page_id in page_ids {
        let inherited: Vec<(&[u8], Object)> = match document.get_dictionary(page_id) {
            Ok(page) => INHERITABLE_KEYS
                .iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| find_inherited(document, page, key).map(|value| (*key, value)))
                .collect(),
            Err(_) => continue,
        };
        if inherited.is_empty() {
            continue;
        }

        if let Ok(page) = document.get_dictionary_mut(page_id) {
            for (key, value) in inherited {
                page.set(key, value);
            }
        }
    }
}

fn find_inherited(document: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = document.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    let info = document.trailer.get(b"Info").ok()?;
    match resolve(document, info)? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, UTF-8 with BOM, otherwise
/// PDFDocEncoding approximated as Latin-1.
fn decode_text(object: &Object) -> Option<String> {
    let bytes = match object {
        Object::String(bytes, _) => bytes.as_slice(),
        _ => return None,
    };

    let text = if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(utf8).into_owned()
    } else {
        bytes.iter().map(|&b| b as char).collect()
    };

    let text = text.trim_matches('\0').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn is_linearized(document: &Document) -> bool {
    document
        .objects
        .values()
        .any(|object| matches!(object, Object::Dictionary(dict) if dict.has(b"Linearized")))
}

fn is_tagged(document: &Document, catalog: &Dictionary) -> bool {
    let mark_info = match catalog
        .get(b"MarkInfo")
        .ok()
        .and_then(|value| resolve(document, value))
    {
        Some(Object::Dictionary(dict)) => dict,
        _ => return false,
    };

    mark_info
        .get(b"Marked")
        .and_then(Object::as_bool)
        .unwrap_or(false)
}

fn xmp_packet(document: &Document, catalog: &Dictionary) -> Option<String> {
    let stream = match resolve(document, catalog.get(b"Metadata").ok()?)? {
        Object::Stream(stream) => stream,
        _ => return None,
    };

    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    Some(String::from_utf8_lossy(&content).into_owned())
}
