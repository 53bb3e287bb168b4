//! PDF document parser using lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::detect::{detect_format_from_path, DocumentFormat};
use crate::error::{Diagnostic, DiagnosticLocation, Error, Extracted, Result};
use crate::model::{Metadata, Page, PageBlock, PdfDocument};

use super::layout::{BBox, LayoutAnalyzer, TextLine, TextSpan, Word};
use super::options::{ErrorMode, ParseOptions};

/// Name-tree and reference chains are followed this deep at most.
const MAX_LOOKUP_DEPTH: usize = 16;

/// Where a link annotation points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// External URI (`/S /URI`)
    Uri(String),
    /// Page in this document, 1-based (`/S /GoTo` or `/Dest`)
    Page(u32),
}

/// A `/Subtype /Link` annotation on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnnotation {
    pub rect: BBox,
    pub target: LinkTarget,
}

/// PDF document parser.
pub struct PdfParser {
    doc: LopdfDocument,
    options: ParseOptions,
    file_name: Option<String>,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();

        if !matches!(detect_format_from_path(path)?, DocumentFormat::Pdf { .. }) {
            return Err(Error::UnknownFormat);
        }

        let doc = LopdfDocument::load(path)?;
        Ok(Self {
            doc,
            options,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self {
            doc,
            options,
            file_name: None,
        })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// The underlying lopdf document.
    pub fn document(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Parse metadata and the text blocks of the selected pages.
    ///
    /// Font statistics for heading detection are gathered over all selected pages
    /// before any page is grouped into blocks.
    pub fn parse(&self) -> Result<Extracted<PdfDocument>> {
        let mut document = PdfDocument {
            metadata: self.metadata(),
            pages: Vec::new(),
        };
        let mut diagnostics = Vec::new();
        let mut analyzer = LayoutAnalyzer::new(&self.doc);

        let mut page_spans: Vec<(u32, Vec<TextSpan>)> = Vec::new();
        for page_num in 1..=self.page_count() {
            if !self.options.pages.includes(page_num) {
                continue;
            }
            match analyzer.extract_page_spans(page_num) {
                Ok(spans) => page_spans.push((page_num, spans)),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticLocation::Page(page_num),
                        format!("text could not be extracted: {}", e),
                    ));
                    page_spans.push((page_num, Vec::new()));
                }
                Err(e) => return Err(e),
            }
        }

        for (_, spans) in &page_spans {
            analyzer.observe(spans);
        }

        for (page_num, spans) in page_spans {
            let (width, height) = self.page_dimensions(page_num);
            let mut page = Page::new(page_num, width, height);
            for block in analyzer.blocks_from_spans(spans) {
                let text = block.text();
                if text.is_empty() {
                    continue;
                }
                page.add_block(if block.heading_level > 0 {
                    PageBlock::heading(text, block.heading_level)
                } else {
                    PageBlock::paragraph(text)
                });
            }
            document.pages.push(page);
        }

        Ok(Extracted::with_diagnostics(document, diagnostics))
    }

    /// Document metadata from the Info dictionary.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.version());
        metadata.page_count = self.page_count();
        metadata.file_name = self.file_name.clone();

        let info = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|info| self.resolve(info))
            .and_then(|info| info.as_dict().ok());

        if let Some(info) = info {
            metadata.title = string_entry(info, b"Title");
            metadata.author = string_entry(info, b"Author");
            metadata.subject = string_entry(info, b"Subject");
            metadata.keywords = string_entry(info, b"Keywords");
            metadata.creator = string_entry(info, b"Creator");
            metadata.producer = string_entry(info, b"Producer");
            metadata.created = string_entry(info, b"CreationDate").and_then(|d| parse_pdf_date(&d));
            metadata.modified = string_entry(info, b"ModDate").and_then(|d| parse_pdf_date(&d));
        }

        metadata
    }

    /// Text spans of a page.
    pub fn page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        LayoutAnalyzer::new(&self.doc).extract_page_spans(page_num)
    }

    /// Words of a page with estimated boxes.
    pub fn page_words(&self, page_num: u32) -> Result<Vec<Word>> {
        LayoutAnalyzer::new(&self.doc).extract_page_words(page_num)
    }

    /// Text lines of a page, top to bottom.
    pub fn page_lines(&self, page_num: u32) -> Result<Vec<TextLine>> {
        let analyzer = LayoutAnalyzer::new(&self.doc);
        let spans = analyzer.extract_page_spans(page_num)?;
        Ok(analyzer.lines_from_spans(spans))
    }

    /// Link annotations of a page, in `/Annots` order.
    ///
    /// Annotations whose target cannot be resolved are skipped.
    pub fn link_annotations(&self, page_num: u32) -> Result<Vec<LinkAnnotation>> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;
        let page = self.doc.get_dictionary(*page_id)?;

        let annots = match page.get(b"Annots").ok().and_then(|a| self.resolve(a)) {
            Some(Object::Array(annots)) => annots,
            _ => return Ok(Vec::new()),
        };

        let mut links = Vec::new();
        for annot in annots {
            let Some(dict) = self.resolve(annot).and_then(|a| a.as_dict().ok()) else {
                continue;
            };
            if name_entry(dict, b"Subtype") != Some("Link") {
                continue;
            }
            let Some(rect) = self.rect_entry(dict) else {
                log::debug!("Link annotation without /Rect on page {}", page_num);
                continue;
            };
            match self.link_target(dict) {
                Some(target) => links.push(LinkAnnotation { rect, target }),
                None => log::debug!("Unresolved link annotation on page {}", page_num),
            }
        }

        Ok(links)
    }

    fn link_target(&self, annot: &Dictionary) -> Option<LinkTarget> {
        if let Some(action) = annot
            .get(b"A")
            .ok()
            .and_then(|a| self.resolve(a))
            .and_then(|a| a.as_dict().ok())
        {
            return match name_entry(action, b"S") {
                Some("URI") => action
                    .get(b"URI")
                    .ok()
                    .and_then(|u| self.resolve(u))
                    .and_then(pdf_string)
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty())
                    .map(LinkTarget::Uri),
                Some("GoTo") => action
                    .get(b"D")
                    .ok()
                    .and_then(|d| self.resolve_destination(d, 0))
                    .map(LinkTarget::Page),
                _ => None,
            };
        }

        annot
            .get(b"Dest")
            .ok()
            .and_then(|d| self.resolve_destination(d, 0))
            .map(LinkTarget::Page)
    }

    /// Resolve a destination (explicit array, name, or dictionary with `/D`) to a 1-based page.
    fn resolve_destination(&self, dest: &Object, depth: usize) -> Option<u32> {
        if depth > MAX_LOOKUP_DEPTH {
            return None;
        }

        match self.resolve(dest)? {
            Object::Array(items) => match items.first()? {
                Object::Reference(page_ref) => self
                    .doc
                    .get_pages()
                    .into_iter()
                    .find(|(_, id)| id == page_ref)
                    .map(|(num, _)| num),
                // Remote-style destinations carry a 0-based page index
                Object::Integer(index) if *index >= 0 => Some(*index as u32 + 1),
                _ => None,
            },
            Object::Dictionary(dict) => self.resolve_destination(dict.get(b"D").ok()?, depth + 1),
            Object::Name(name) | Object::String(name, _) => {
                let target = self.named_destination(name)?;
                self.resolve_destination(target, depth + 1)
            }
            _ => None,
        }
    }

    /// Look up a named destination in the catalog `/Dests` dictionary or the `/Names` tree.
    fn named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.doc.catalog().ok()?;

        if let Some(dests) = catalog
            .get(b"Dests")
            .ok()
            .and_then(|d| self.resolve(d))
            .and_then(|d| d.as_dict().ok())
        {
            if let Ok(dest) = dests.get(name) {
                return Some(dest);
            }
        }

        let tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|n| self.resolve(n))
            .and_then(|n| n.as_dict().ok())?
            .get(b"Dests")
            .ok()
            .and_then(|d| self.resolve(d))
            .and_then(|d| d.as_dict().ok())?;
        self.lookup_name_tree(tree, name, 0)
    }

    fn lookup_name_tree<'a>(&'a self, node: &'a Dictionary, name: &[u8], depth: usize) -> Option<&'a Object> {
        if depth > MAX_LOOKUP_DEPTH {
            return None;
        }

        if let Some(Object::Array(pairs)) = node.get(b"Names").ok().and_then(|n| self.resolve(n)) {
            for pair in pairs.chunks_exact(2) {
                if let Some(Object::String(key, _)) = self.resolve(&pair[0]) {
                    if key.as_slice() == name {
                        return Some(&pair[1]);
                    }
                }
            }
        }

        if let Some(Object::Array(kids)) = node.get(b"Kids").ok().and_then(|k| self.resolve(k)) {
            for kid in kids {
                if let Some(kid) = self.resolve(kid).and_then(|k| k.as_dict().ok()) {
                    if let Some(found) = self.lookup_name_tree(kid, name, depth + 1) {
                        return Some(found);
                    }
                }
            }
        }

        None
    }

    fn rect_entry(&self, dict: &Dictionary) -> Option<BBox> {
        let Object::Array(values) = self.resolve(dict.get(b"Rect").ok()?)? else {
            return None;
        };
        let numbers: Vec<f32> = values.iter().filter_map(number).collect();
        match numbers.as_slice() {
            [x0, y0, x1, y1, ..] => Some(BBox::new(*x0, *y0, *x1, *y1)),
            _ => None,
        }
    }

    /// Follow references until a direct object is reached.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        let mut current = obj;
        for _ in 0..MAX_LOOKUP_DEPTH {
            match current {
                Object::Reference(id) => current = self.doc.get_object(*id).ok()?,
                other => return Some(other),
            }
        }
        None
    }

    /// Page size from `/MediaBox`, Letter when absent.
    fn page_dimensions(&self, page_num: u32) -> (f32, f32) {
        let pages = self.doc.get_pages();
        let media_box = pages
            .get(&page_num)
            .and_then(|id| self.doc.get_dictionary(*id).ok())
            .and_then(|page| page.get(b"MediaBox").ok())
            .and_then(|mb| self.resolve(mb));

        if let Some(Object::Array(values)) = media_box {
            let numbers: Vec<f32> = values.iter().filter_map(number).collect();
            if let [x0, y0, x1, y1, ..] = numbers.as_slice() {
                return ((x1 - x0).abs(), (y1 - y0).abs());
            }
        }
        (612.0, 792.0)
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn name_entry<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a str> {
    dict.get(key).ok().and_then(|o| o.as_name_str().ok())
}

fn string_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(pdf_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8, or Latin-1) or name.
fn pdf_string(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => {
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                Some(
                    String::from_utf8(bytes.clone())
                        .unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect()),
                )
            }
        }
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}
