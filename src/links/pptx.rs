//! Hyperlinks from a parsed presentation.
//!
//! The shape tree is walked depth-first in document order. Shape-level click
//! actions, runs in text bodies and table cells, and chart titles each contribute
//! records; records are then deduplicated per slide and URL.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use crate::error::{Diagnostic, DiagnosticLocation, Extracted};
use crate::model::{HyperlinkRecord, Location, Paragraph, Presentation, Shape, ShapeKind, Slide, TextRun};
use crate::parser::{ParseOptions, PptxParser};

use super::normalize_url;

/// A maximal run of consecutive text runs that share a link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroup {
    /// Indices into the paragraph's runs
    pub runs: Range<usize>,
    /// Char range in the paragraph text (line breaks count as one char)
    pub chars: Range<usize>,
    /// Concatenated run text, untrimmed
    pub text: String,
    /// Link target as stored on the runs
    pub url: String,
}

/// Split runs into contiguous same-target groups.
///
/// Runs without a target end the current group. Two adjacent groups with different
/// targets stay separate even when their text touches.
pub fn group_runs_by_link(runs: &[TextRun]) -> Vec<LinkGroup> {
    let mut groups: Vec<LinkGroup> = Vec::new();
    let mut offset = 0;

    for (index, run) in runs.iter().enumerate() {
        let len = if run.line_break {
            1
        } else {
            run.text.chars().count()
        };
        let start = offset;
        offset += len;

        let Some(url) = run.hyperlink.as_deref().filter(|_| !run.line_break) else {
            continue;
        };

        match groups.last_mut() {
            Some(group) if group.url == url && group.runs.end == index => {
                group.runs.end = index + 1;
                group.chars.end = offset;
                group.text.push_str(&run.text);
            }
            _ => groups.push(LinkGroup {
                runs: index..index + 1,
                chars: start..offset,
                text: run.text.clone(),
                url: url.to_string(),
            }),
        }
    }

    groups
}

/// Extracts hyperlink records from a presentation's shape tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxLinkExtractor;

impl PptxLinkExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Records for every slide, deduplicated per slide.
    pub fn extract(&self, presentation: &Presentation) -> Extracted<Vec<HyperlinkRecord>> {
        let records = presentation
            .slides
            .iter()
            .flat_map(|slide| self.extract_slide(slide))
            .collect();
        Extracted::clean(records)
    }

    /// Records of one slide in first-seen order.
    pub fn extract_slide(&self, slide: &Slide) -> Vec<HyperlinkRecord> {
        let mut collector = LinkCollector::new(slide.number);
        collector.visit_all(&slide.shapes, None);
        collector.finish()
    }

    /// Parse a file and extract its records.
    ///
    /// A document that cannot be opened yields no records and a document-level
    /// diagnostic; shapes the parser skipped are reported as slide diagnostics.
    pub fn extract_path<P: AsRef<Path>>(&self, path: P) -> Extracted<Vec<HyperlinkRecord>> {
        let path = path.as_ref();
        let parsed = PptxParser::open_with_options(path, ParseOptions::default())
            .and_then(|parser| parser.parse());

        match parsed {
            Ok(parsed) => {
                let (presentation, mut diagnostics) = parsed.into_parts();
                let (records, more) = self.extract(&presentation).into_parts();
                diagnostics.extend(more);
                Extracted::with_diagnostics(records, diagnostics)
            }
            Err(e) => {
                log::error!("Error extracting PowerPoint hyperlinks from {}: {}", path.display(), e);
                Extracted::with_diagnostics(
                    Vec::new(),
                    vec![Diagnostic::new(DiagnosticLocation::Document, e.to_string())],
                )
            }
        }
    }
}

/// Per-slide accumulator keyed by URL.
struct LinkCollector {
    slide: u32,
    records: Vec<HyperlinkRecord>,
    by_url: HashMap<String, usize>,
}

impl LinkCollector {
    fn new(slide: u32) -> Self {
        Self {
            slide,
            records: Vec::new(),
            by_url: HashMap::new(),
        }
    }

    fn location(&self) -> Location {
        Location::Slide(self.slide)
    }

    fn visit_all(&mut self, shapes: &[Shape], label: Option<&str>) {
        let mut groups = 0;
        for shape in shapes {
            let child_label = if matches!(shape.kind, ShapeKind::Group(_)) {
                groups += 1;
                Some(match label {
                    Some(parent) => format!("{}.{}", parent, groups),
                    None => format!("Group {}", groups),
                })
            } else {
                None
            };
            self.visit(shape, label, child_label.as_deref());
        }
    }

    fn visit(&mut self, shape: &Shape, label: Option<&str>, group_label: Option<&str>) {
        let slide = self.slide;

        if let Some(url) = shape.hyperlink.as_deref() {
            let text = shape.plain_text();
            let text = if text.is_empty() {
                shape.meaningful_alt_text().unwrap_or_default().to_string()
            } else {
                text
            };
            self.push(&text, url, || link_label(slide, label));
        }

        match &shape.kind {
            ShapeKind::TextBox(body) | ShapeKind::Placeholder(body) => {
                for paragraph in &body.paragraphs {
                    self.visit_paragraph(paragraph, || link_label(slide, label));
                }
            }
            ShapeKind::Table(table) => {
                for (r, row) in table.rows.iter().enumerate() {
                    for (c, cell) in row.cells.iter().enumerate() {
                        let fallback =
                            || format!("Table on Slide {}, row {}, cell {}", slide, r + 1, c + 1);
                        for paragraph in &cell.paragraphs {
                            self.visit_paragraph(paragraph, &fallback);
                        }
                    }
                }
            }
            ShapeKind::Group(children) => {
                self.visit_all(children, group_label.or(label));
            }
            ShapeKind::Chart(chart) => {
                if let Some(title) = &chart.title {
                    for paragraph in &title.paragraphs {
                        self.visit_paragraph(paragraph, || link_label(slide, label));
                    }
                }
            }
            ShapeKind::Picture(_) | ShapeKind::Decoration => {}
        }
    }

    fn visit_paragraph(&mut self, paragraph: &Paragraph, fallback: impl Fn() -> String) {
        for group in group_runs_by_link(&paragraph.runs) {
            self.push(&group.text, &group.url, &fallback);
        }
    }

    fn push(&mut self, text: &str, url: &str, fallback: impl Fn() -> String) {
        let url = normalize_url(url);
        if url.is_empty() {
            return;
        }

        let text = text.trim();
        let record = if text.is_empty() {
            HyperlinkRecord::synthesized(fallback(), url.clone(), self.location())
        } else {
            HyperlinkRecord::new(text, url.clone(), self.location())
        };

        match self.by_url.get(&url) {
            Some(&index) => {
                let existing = &mut self.records[index];
                if is_better(&record, existing) {
                    *existing = record;
                }
            }
            None => {
                self.by_url.insert(url, self.records.len());
                self.records.push(record);
            }
        }
    }

    fn finish(self) -> Vec<HyperlinkRecord> {
        self.records
    }
}

/// Generated label for a link without usable text, prefixed with the group nesting label.
fn link_label(slide: u32, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{} Link on Slide {}", label, slide),
        None => format!("Link on Slide {}", slide),
    }
}

/// Real text beats a generated label; otherwise the longer text wins.
fn is_better(candidate: &HyperlinkRecord, existing: &HyperlinkRecord) -> bool {
    match (candidate.synthesized, existing.synthesized) {
        (false, true) => true,
        (true, false) => false,
        _ => candidate.text.chars().count() > existing.text.chars().count(),
    }
}
