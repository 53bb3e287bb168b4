//! PDF document converter implementation.

use std::path::Path;

use crate::detect::DocumentFormat;
use crate::error::{Extracted, Result};
use crate::links::PdfLinkExtractor;
use crate::model::StructuredDocument;
use crate::parser::PdfParser;
use crate::render::MarkdownAssembler;

use super::{ConversionContext, ConvertOptions, ConvertResult, DocumentConverter};

/// PDF document converter.
///
/// Converts PDF pages to Markdown paragraphs and headings, or to JSON.
#[derive(Debug, Clone, Default)]
pub struct PdfConverter {
    _private: (),
}

impl PdfConverter {
    /// Create a new PDF converter.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Parse a file into pages, metadata and hyperlinks without rendering.
    pub fn extract_structured(
        &self,
        path: &Path,
        options: &ConvertOptions,
    ) -> Result<Extracted<StructuredDocument>> {
        let parser = PdfParser::open_with_options(path, options.parse_options())?;
        self.structure(&parser, options)
    }

    /// Bytes counterpart of [`extract_structured`](Self::extract_structured).
    pub fn extract_structured_bytes(
        &self,
        bytes: &[u8],
        options: &ConvertOptions,
    ) -> Result<Extracted<StructuredDocument>> {
        let parser = PdfParser::from_bytes_with_options(bytes, options.parse_options())?;
        self.structure(&parser, options)
    }

    fn structure(
        &self,
        parser: &PdfParser,
        options: &ConvertOptions,
    ) -> Result<Extracted<StructuredDocument>> {
        let mut context = ConversionContext::new(options, self.format(parser));
        let document = context.absorb(parser.parse()?);

        let selection = &options.render.page_selection;
        let mut hyperlinks = context.absorb(
            PdfLinkExtractor::with_options(options.links.clone()).extract(parser),
        );
        hyperlinks.retain(|link| selection.includes(link.location.number()));
        context.ensure_strict()?;

        let structured = StructuredDocument {
            document,
            hyperlinks,
        };
        Ok(Extracted::with_diagnostics(structured, context.diagnostics().to_vec()))
    }

    fn format(&self, parser: &PdfParser) -> DocumentFormat {
        DocumentFormat::Pdf {
            version: parser.version(),
        }
    }

    fn finish(
        &self,
        extracted: Extracted<StructuredDocument>,
        format: DocumentFormat,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let mut context = ConversionContext::new(options, format);
        let structured = context.absorb(extracted);

        context.finish(&structured, &structured.document.metadata, |document| {
            MarkdownAssembler::new(options.render_options()).render_document(document)
        })
    }
}

impl DocumentConverter for PdfConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let parser = PdfParser::open_with_options(path, options.parse_options())?;
        let extracted = self.structure(&parser, options)?;
        self.finish(extracted, self.format(&parser), options)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let parser = PdfParser::from_bytes_with_options(bytes, options.parse_options())?;
        let extracted = self.structure(&parser, options)?;
        self.finish(extracted, self.format(&parser), options)
    }
}
