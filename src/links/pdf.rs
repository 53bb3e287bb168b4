//! Hyperlinks from PDF link annotations and bare URLs in page text.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;

use crate::error::{Diagnostic, DiagnosticLocation, Extracted, Result};
use crate::model::{HyperlinkRecord, Location};
use crate::parser::{
    sort_reading_order, BBox, LayoutAnalyzer, LinkTarget, PdfParser, TextSpan, Word,
};

use super::normalize_url;

/// `http(s)://` followed by URL body characters.
const URL_PATTERN: &str = r#"https?://[^\s<>"'`{}|\\^\[\]]+"#;

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', '\'', '"'];

/// Options for PDF hyperlink extraction.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Characters of page text taken on each side of a bare URL
    pub context_size: usize,

    /// Maximum length of a bare URL's context text
    pub context_cap: usize,

    /// Points added on every side of a link rectangle before matching words
    pub rect_margin: f32,
}

impl LinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_size(mut self, size: usize) -> Self {
        self.context_size = size;
        self
    }

    pub fn with_context_cap(mut self, cap: usize) -> Self {
        self.context_cap = cap;
        self
    }

    pub fn with_rect_margin(mut self, margin: f32) -> Self {
        self.rect_margin = margin;
        self
    }
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            context_size: 50,
            context_cap: 100,
            rect_margin: 10.0,
        }
    }
}

/// Extracts hyperlink records from PDF pages.
pub struct PdfLinkExtractor {
    options: LinkOptions,
    url_pattern: Regex,
}

impl PdfLinkExtractor {
    pub fn new() -> Self {
        Self::with_options(LinkOptions::default())
    }

    pub fn with_options(options: LinkOptions) -> Self {
        Self {
            options,
            url_pattern: Regex::new(URL_PATTERN).unwrap(),
        }
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    /// Records for every page in page order.
    ///
    /// Pages that fail are skipped with a diagnostic.
    pub fn extract(&self, parser: &PdfParser) -> Extracted<Vec<HyperlinkRecord>> {
        let mut records = Vec::new();
        let mut diagnostics = Vec::new();

        for page in 1..=parser.page_count() {
            match self.extract_page(parser, page) {
                Ok(found) => records.extend(found),
                Err(e) => {
                    log::warn!("Skipping hyperlinks on page {}: {}", page, e);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticLocation::Page(page),
                        format!("hyperlinks could not be extracted: {}", e),
                    ));
                }
            }
        }

        Extracted::with_diagnostics(records, diagnostics)
    }

    /// Open a file and extract its records; an unreadable file yields none.
    pub fn extract_path<P: AsRef<Path>>(&self, path: P) -> Extracted<Vec<HyperlinkRecord>> {
        let path = path.as_ref();
        match PdfParser::open(path) {
            Ok(parser) => self.extract(&parser),
            Err(e) => {
                log::error!("Error extracting PDF hyperlinks from {}: {}", path.display(), e);
                Extracted::with_diagnostics(
                    Vec::new(),
                    vec![Diagnostic::new(DiagnosticLocation::Document, e.to_string())],
                )
            }
        }
    }

    /// Annotation links first, then bare URLs not already recorded on the page.
    pub fn extract_page(&self, parser: &PdfParser, page: u32) -> Result<Vec<HyperlinkRecord>> {
        let spans = parser.page_spans(page)?;
        let words: Vec<Word> = spans.iter().flat_map(TextSpan::words).collect();
        let location = Location::Page(page);

        let mut records = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for annotation in parser.link_annotations(page)? {
            let text = self.text_under(&words, &annotation.rect);
            let record = match annotation.target {
                LinkTarget::Uri(uri) => {
                    let url = normalize_url(&uri);
                    if text.is_empty() {
                        HyperlinkRecord::synthesized(format!("Link on page {}", page), url, location)
                    } else {
                        HyperlinkRecord::new(text, url, location)
                    }
                }
                LinkTarget::Page(dest) => {
                    let url = format!("#page={}", dest);
                    if text.is_empty() {
                        HyperlinkRecord::synthesized(format!("Go to page {}", dest), url, location)
                    } else {
                        HyperlinkRecord::new(text, url, location)
                    }
                }
            };
            seen.insert(record.url.clone());
            records.push(record);
        }

        let lines = LayoutAnalyzer::new(parser.document()).lines_from_spans(spans);
        let page_text = lines
            .iter()
            .map(|line| line.text())
            .collect::<Vec<_>>()
            .join("\n");
        records.extend(self.bare_urls(&page_text, page, &mut seen));

        Ok(records)
    }

    /// Words intersecting the expanded rectangle, in reading order.
    fn text_under(&self, words: &[Word], rect: &BBox) -> String {
        let area = rect.expand(self.options.rect_margin);
        let mut hits: Vec<&Word> = words.iter().filter(|w| w.bbox.intersects(&area)).collect();
        sort_reading_order(&mut hits);
        hits.iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// URLs written out in the page text, each with a window of surrounding text.
    fn bare_urls(&self, page_text: &str, page: u32, seen: &mut HashSet<String>) -> Vec<HyperlinkRecord> {
        let text = page_text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut records = Vec::new();

        for found in self.url_pattern.find_iter(&text) {
            let raw = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            if raw.is_empty() {
                continue;
            }
            let url = normalize_url(raw);
            if !seen.insert(url.clone()) {
                continue;
            }

            let start = text[..found.start()].chars().count();
            let location = Location::Page(page);
            let record = match self.context_window(&text, start, raw.chars().count()) {
                Some(context) => HyperlinkRecord::new(context, url, location),
                None => HyperlinkRecord::synthesized(format!("URL on page {}", page), url, location),
            };
            records.push(record);
        }

        records
    }

    /// ±`context_size` chars around the URL, narrowed symmetrically to `context_cap`.
    ///
    /// `None` when the URL alone exceeds the cap or nothing but the URL remains.
    fn context_window(&self, text: &str, url_start: usize, url_len: usize) -> Option<String> {
        let chars: Vec<char> = text.chars().collect();
        let url_end = url_start + url_len;
        let cap = self.options.context_cap;
        if url_len > cap {
            return None;
        }

        let mut start = url_start.saturating_sub(self.options.context_size);
        let mut end = (url_end + self.options.context_size).min(chars.len());

        if end - start > cap {
            let spare = cap - url_len;
            let before = (url_start - start).min(spare / 2);
            let after = (end - url_end).min(spare - before);
            // Give unused room on the right back to the left side
            let before = (url_start - start).min(spare - after);
            start = url_start - before;
            end = url_end + after;
        }

        let window: String = chars[start..end].iter().collect();
        let window = window.trim();
        let url: String = chars[url_start..url_end].iter().collect();
        if window.is_empty() || window == url {
            return None;
        }
        Some(window.to_string())
    }
}

impl Default for PdfLinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}
