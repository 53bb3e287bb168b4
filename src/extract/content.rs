//! Turns ordered shapes into content blocks.

use crate::error::{Diagnostic, DiagnosticLocation, Error, Extracted, Result};
use crate::links::normalize_url;
use crate::model::{
    BlockPayload, CellContent, Chart, ChartContent, ContentBlock, ConvertedSlide, ImageRef,
    Presentation, Shape, ShapeKind, Slide, Table,
};
use crate::parser::slide::MAX_GROUP_DEPTH;

use super::order::{ReadingOrderEntry, ReadingOrderOptions, ReadingOrderResolver};
use super::text::TextFormatter;

/// Alt text used for pictures without a meaningful description.
const DEFAULT_IMAGE_ALT: &str = "Image";

/// Per-slide walk state.
struct SlideWalk<'r> {
    slide: u32,
    resolver: &'r ReadingOrderResolver,
    diagnostics: Vec<Diagnostic>,
}

/// Extracts content blocks from slides in reading order.
#[derive(Default)]
pub struct ShapeContentExtractor {
    formatter: TextFormatter,
}

impl ShapeContentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract every slide with a resolver chosen for the whole deck.
    pub fn extract_presentation(
        &self,
        presentation: &Presentation,
        options: &ReadingOrderOptions,
    ) -> Extracted<Vec<ConvertedSlide>> {
        let resolver = ReadingOrderResolver::for_presentation(presentation, options);
        self.extract_slides(&presentation.slides, &resolver)
    }

    /// Extract the given slides with an already chosen resolver.
    pub fn extract_slides(
        &self,
        selected: &[Slide],
        resolver: &ReadingOrderResolver,
    ) -> Extracted<Vec<ConvertedSlide>> {
        let mut slides = Vec::with_capacity(selected.len());
        let mut diagnostics = Vec::new();

        for slide in selected {
            let (converted, slide_diagnostics) = self.extract_slide(slide, resolver).into_parts();
            slides.push(converted);
            diagnostics.extend(slide_diagnostics);
        }

        Extracted::with_diagnostics(slides, diagnostics)
    }

    /// Extract one slide.
    ///
    /// A shape that cannot be extracted leaves an empty text block at its rank and a
    /// diagnostic; its siblings are unaffected.
    pub fn extract_slide(
        &self,
        slide: &Slide,
        resolver: &ReadingOrderResolver,
    ) -> Extracted<ConvertedSlide> {
        let mut walk = SlideWalk {
            slide: slide.number,
            resolver,
            diagnostics: Vec::new(),
        };

        let (strategy, entries) = resolver.resolve_slide(slide);
        let mut blocks = self.extract_entries(&mut walk, entries, 0);
        assign_ranks(&mut blocks);

        Extracted::with_diagnostics(
            ConvertedSlide {
                number: slide.number,
                strategy,
                blocks,
            },
            walk.diagnostics,
        )
    }

    fn extract_entries(
        &self,
        walk: &mut SlideWalk<'_>,
        entries: Vec<ReadingOrderEntry<'_>>,
        depth: usize,
    ) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();

        for entry in entries {
            match self.extract_shape(walk, entry.shape, depth) {
                Ok(found) => blocks.extend(found),
                Err(e) => {
                    log::warn!(
                        "Skipping {} '{}' on slide {}: {}",
                        entry.shape.kind_name(),
                        entry.shape.name,
                        walk.slide,
                        e
                    );
                    walk.diagnostics.push(Diagnostic::new(
                        DiagnosticLocation::Slide(walk.slide),
                        format!("{} '{}' skipped: {}", entry.shape.kind_name(), entry.shape.name, e),
                    ));
                    blocks.push(ContentBlock::empty_text(walk.slide, 0));
                }
            }
        }

        blocks
    }

    /// Blocks for one shape; groups without a click link flatten into their children.
    fn extract_shape(
        &self,
        walk: &mut SlideWalk<'_>,
        shape: &Shape,
        depth: usize,
    ) -> Result<Vec<ContentBlock>> {
        let slide = walk.slide;
        let role = walk.resolver.role_of(shape);
        let block = |payload: BlockPayload| {
            let mut block = ContentBlock::new(slide, 0, payload);
            block.role = role;
            block.hyperlink = shape.hyperlink.as_deref().map(normalize_url);
            block
        };

        let payload = match &shape.kind {
            ShapeKind::Group(children) => {
                if depth >= MAX_GROUP_DEPTH {
                    return Err(Error::ShapeExtract(format!(
                        "group nesting exceeds {} levels",
                        MAX_GROUP_DEPTH
                    )));
                }
                let entries = walk.resolver.resolve_order(children);
                let mut children = self.extract_entries(walk, entries, depth + 1);
                if shape.hyperlink.is_none() {
                    return Ok(children);
                }
                assign_ranks(&mut children);
                BlockPayload::Group { children }
            }
            ShapeKind::TextBox(body) | ShapeKind::Placeholder(body) => {
                let inherit = shape
                    .placeholder_type()
                    .is_some_and(|p| p.has_master_bullets());
                let paragraphs = self.formatter.analyze_body(body, slide, inherit);
                if paragraphs.is_empty() {
                    match shape.meaningful_alt_text() {
                        Some(alt) => BlockPayload::Image {
                            alt_text: alt.to_string(),
                            target: None,
                        },
                        None => return Ok(Vec::new()),
                    }
                } else {
                    BlockPayload::Text { paragraphs }
                }
            }
            ShapeKind::Table(table) => {
                let rows = self.table_rows(table, slide);
                if rows.is_empty() {
                    return Ok(Vec::new());
                }
                BlockPayload::Table { rows }
            }
            ShapeKind::Picture(image) => picture_payload(shape, image),
            ShapeKind::Chart(chart) => BlockPayload::Chart(chart_content(chart)),
            ShapeKind::Decoration => match shape.meaningful_alt_text() {
                Some(alt) => BlockPayload::Image {
                    alt_text: alt.to_string(),
                    target: None,
                },
                None => return Ok(Vec::new()),
            },
        };

        Ok(vec![block(payload)])
    }

    fn table_rows(&self, table: &Table, slide: u32) -> Vec<Vec<CellContent>> {
        table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| CellContent {
                        paragraphs: cell
                            .paragraphs
                            .iter()
                            .filter_map(|p| self.formatter.analyze_paragraph(p, slide, false))
                            .collect(),
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect()
    }
}

fn picture_payload(shape: &Shape, image: &ImageRef) -> BlockPayload {
    BlockPayload::Image {
        alt_text: shape
            .meaningful_alt_text()
            .unwrap_or(DEFAULT_IMAGE_ALT)
            .to_string(),
        target: image.file_name().map(str::to_string),
    }
}

fn chart_content(chart: &Chart) -> ChartContent {
    ChartContent {
        title: chart.title_text(),
        chart_type: chart.chart_type.clone(),
        categories: chart.categories.clone(),
        series: chart
            .series
            .iter()
            .map(|s| (s.name.clone(), s.values.clone()))
            .collect(),
    }
}

fn assign_ranks(blocks: &mut [ContentBlock]) {
    for (rank, block) in blocks.iter_mut().enumerate() {
        block.order_rank = rank as u32;
    }
}
