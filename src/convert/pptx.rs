//! PowerPoint converter: parse, order and extract shapes, collect hyperlinks.

use std::path::Path;

use crate::detect::DocumentFormat;
use crate::error::{DiagnosticLocation, Extracted, Result};
use crate::extract::{ReadingOrderResolver, ShapeContentExtractor};
use crate::links::PptxLinkExtractor;
use crate::model::{Presentation, StructuredPresentation};
use crate::parser::{ParseOptions, PptxParser};
use crate::render::{MarkdownAssembler, PageSelection};

use super::{ConversionContext, ConvertOptions, ConvertResult, DocumentConverter};

/// PPTX document converter.
#[derive(Default)]
pub struct PptxConverter {
    extractor: ShapeContentExtractor,
    links: PptxLinkExtractor,
}

impl PptxConverter {
    /// Create a new PPTX converter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a file into slides, metadata and hyperlinks without rendering.
    pub fn extract_structured(
        &self,
        path: &Path,
        options: &ConvertOptions,
    ) -> Result<Extracted<StructuredPresentation>> {
        let parser = PptxParser::open_with_options(path, whole_deck(options))?;
        self.structure(parser.parse()?, options)
    }

    /// Bytes counterpart of [`extract_structured`](Self::extract_structured).
    pub fn extract_structured_bytes(
        &self,
        bytes: &[u8],
        options: &ConvertOptions,
    ) -> Result<Extracted<StructuredPresentation>> {
        let parser = PptxParser::from_bytes_with_options(bytes.to_vec(), whole_deck(options))?;
        self.structure(parser.parse()?, options)
    }

    fn structure(
        &self,
        parsed: Extracted<Presentation>,
        options: &ConvertOptions,
    ) -> Result<Extracted<StructuredPresentation>> {
        let mut context = ConversionContext::new(options, DocumentFormat::Pptx);
        let (mut presentation, diagnostics) = parsed.into_parts();

        // The strategy is chosen over the whole deck before the selection narrows it.
        let resolver = ReadingOrderResolver::for_presentation(&presentation, &options.reading_order);
        let selection = &options.render.page_selection;
        presentation.slides.retain(|slide| selection.includes(slide.number));
        context.record(diagnostics.into_iter().filter(|d| match d.location {
            DiagnosticLocation::Slide(n) => selection.includes(n),
            _ => true,
        }));

        let slides = context.absorb(self.extractor.extract_slides(&presentation.slides, &resolver));
        context.ensure_strict()?;
        let hyperlinks = context.absorb(self.links.extract(&presentation));

        let structured = StructuredPresentation {
            metadata: presentation.metadata,
            slides,
            hyperlinks,
        };
        Ok(Extracted::with_diagnostics(structured, context.diagnostics().to_vec()))
    }

    fn finish(
        &self,
        extracted: Extracted<StructuredPresentation>,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let mut context = ConversionContext::new(options, DocumentFormat::Pptx);
        let structured = context.absorb(extracted);
        log::debug!(
            "Extracted {} slides and {} hyperlinks",
            structured.slide_count(),
            structured.hyperlinks.len()
        );

        context.finish(&structured, &structured.metadata, |presentation| {
            MarkdownAssembler::new(options.render_options()).render_presentation(presentation)
        })
    }
}

/// Slides are always parsed in full; the selection applies after ordering is decided.
fn whole_deck(options: &ConvertOptions) -> ParseOptions {
    options.parse_options().with_pages(PageSelection::All)
}

impl DocumentConverter for PptxConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pptx"]
    }

    fn name(&self) -> &str {
        "pptx"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let extracted = self.extract_structured(path, options)?;
        self.finish(extracted, options)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let extracted = self.extract_structured_bytes(bytes, options)?;
        self.finish(extracted, options)
    }
}
