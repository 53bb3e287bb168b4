//! # undeck
//!
//! PowerPoint and PDF to Markdown conversion for LLM ingestion.
//!
//! Slides are read in a reconstructed reading order (accessibility metadata when the deck
//! has it, geometry otherwise), shapes become Markdown blocks with their hyperlinks inline,
//! and every link is also listed in a trailing appendix grouped by slide or page.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> undeck::Result<()> {
//!     let markdown = undeck::convert_pptx_to_markdown("deck.pptx", true)?;
//!     println!("{}", markdown);
//!
//!     for link in undeck::extract_pdf_hyperlinks("report.pdf") {
//!         println!("{} -> {}", link.text, link.url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Reading order**: accessibility, placeholder-semantic and spatial strategies
//! - **Hyperlinks**: run-level and shape-level PPTX links, PDF annotations and bare URLs
//! - **Structured output**: slides, metadata and hyperlinks as JSON
//! - **Enhancement seam**: optional whole-document Markdown post-processing
//! - **Parallel batches**: independent files converted with Rayon

pub mod convert;
pub mod detect;
pub mod enhance;
pub mod error;
pub mod extract;
pub mod links;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, OutputFormat,
    PdfConverter, PptxConverter,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, is_pptx, DocumentFormat};
pub use enhance::{enhance_markdown, EnhanceContext, Enhanced, MarkdownEnhancer};
pub use error::{Diagnostic, DiagnosticLocation, Error, Extracted, Result};
pub use extract::{ReadingOrderOptions, ReadingOrderResolver, ShapeContentExtractor};
pub use links::{
    extract_pdf_hyperlinks, extract_pptx_hyperlinks, format_hyperlinks_section, normalize_url,
    LinkOptions, PdfLinkExtractor, PptxLinkExtractor,
};
pub use model::{
    ContentBlock, ConvertedSlide, HyperlinkRecord, Location, Metadata, Presentation,
    ReadingStrategy, SemanticRole, Shape, ShapeKind, Slide, StructuredDocument,
    StructuredPresentation,
};
pub use parser::{ErrorMode, ParseOptions, PdfParser, PptxParser};
pub use render::{JsonFormat, MetadataStyle, PageSelection, RenderOptions};

use std::path::Path;
use std::sync::Arc;

/// Convert a presentation to Markdown.
///
/// With `use_accessibility_order` the deck's accessibility metadata decides the shape
/// order when it exists; otherwise placeholders and geometry do.
///
/// # Example
///
/// ```no_run
/// let markdown = undeck::convert_pptx_to_markdown("deck.pptx", true).unwrap();
/// std::fs::write("deck.md", markdown).unwrap();
/// ```
pub fn convert_pptx_to_markdown<P: AsRef<Path>>(
    path: P,
    use_accessibility_order: bool,
) -> Result<String> {
    let options = ConvertOptions::new().with_accessibility_order(use_accessibility_order);
    PptxConverter::new()
        .convert(path.as_ref(), &options)
        .map(|result| result.content)
}

/// Convert a PDF to Markdown with its hyperlink appendix.
pub fn convert_pdf_to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    PdfConverter::new()
        .convert(path.as_ref(), &ConvertOptions::default())
        .map(|result| result.content)
}

/// Convert a PPTX or PDF file to Markdown, detecting the format from its contents.
///
/// # Example
///
/// ```no_run
/// let markdown = undeck::to_markdown("slides-or-report").unwrap();
/// println!("{}", markdown);
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let options = ConvertOptions::default();
    match detect_format_from_path(path)? {
        DocumentFormat::Pptx => PptxConverter::new().convert(path, &options),
        DocumentFormat::Pdf { .. } => PdfConverter::new().convert(path, &options),
    }
    .map(|result| result.content)
}

/// Convert a PPTX or PDF file to structured JSON.
pub fn to_json<P: AsRef<Path>>(path: P) -> Result<String> {
    Undeck::new().with_format(OutputFormat::Json).convert(path)
}

/// Builder for converting documents.
///
/// # Example
///
/// ```no_run
/// use undeck::{MetadataStyle, Undeck};
///
/// let markdown = Undeck::new()
///     .spatial_order()
///     .with_metadata(MetadataStyle::Frontmatter)
///     .without_hyperlink_section()
///     .convert("deck.pptx")?;
/// # Ok::<(), undeck::Error>(())
/// ```
pub struct Undeck {
    options: ConvertOptions,
    registry: ConverterRegistry,
}

impl Undeck {
    /// Create a new Undeck builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            registry: ConverterRegistry::with_defaults(),
        }
    }

    /// Ignore accessibility metadata and order shapes by placeholders and geometry.
    pub fn spatial_order(mut self) -> Self {
        self.options = self.options.with_accessibility_order(false);
        self
    }

    /// Fail on the first malformed shape or page.
    pub fn strict(mut self) -> Self {
        self.options = self.options.with_error_mode(ErrorMode::Strict);
        self
    }

    /// Set how document metadata is emitted.
    pub fn with_metadata(mut self, style: MetadataStyle) -> Self {
        self.options.render = self.options.render.with_metadata(style);
        self
    }

    /// Omit the trailing hyperlink appendix.
    pub fn without_hyperlink_section(mut self) -> Self {
        self.options.render = self.options.render.with_hyperlink_section(false);
        self
    }

    /// Omit `<!-- Slide N -->` markers.
    pub fn without_slide_markers(mut self) -> Self {
        self.options.render = self.options.render.with_slide_markers(false);
        self
    }

    /// Keep short unlisted paragraphs as plain text instead of `##`/`###` headings.
    pub fn without_heading_promotion(mut self) -> Self {
        self.options.render = self.options.render.with_heading_promotion(false);
        self
    }

    /// Set slide or page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options.render = self.options.render.with_pages(pages);
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.options = self.options.with_format(format);
        self
    }

    /// Post-process the Markdown with an enhancer.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn MarkdownEnhancer>) -> Self {
        self.options = self.options.with_enhancer(enhancer);
        self
    }

    /// The options this builder converts with.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a file and return only the content.
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        self.convert_full(path).map(|result| result.content)
    }

    /// Convert a file and return the content with metadata and diagnostics.
    pub fn convert_full<P: AsRef<Path>>(&self, path: P) -> Result<ConvertResult> {
        self.registry.convert(path.as_ref(), &self.options)
    }

    /// Convert in-memory data, detecting its format.
    pub fn convert_bytes(&self, data: &[u8]) -> Result<ConvertResult> {
        let format = detect_format_from_bytes(data)?;
        self.registry
            .convert_bytes(data, format.extension(), &self.options)
    }
}

impl Default for Undeck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeck_builder() {
        let undeck = Undeck::new()
            .spatial_order()
            .strict()
            .with_metadata(MetadataStyle::Comment)
            .without_hyperlink_section();

        let options = undeck.options();
        assert!(!options.reading_order.use_accessibility_order);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.render.metadata, MetadataStyle::Comment);
        assert!(!options.render.hyperlink_section);
    }

    #[test]
    fn test_undeck_builder_default() {
        let undeck = Undeck::default();
        assert!(undeck.options().reading_order.use_accessibility_order);
        assert!(undeck.options().render.hyperlink_section);
        assert_eq!(undeck.options().output_format, OutputFormat::Markdown);
    }

    #[test]
    fn test_undeck_builder_with_pages() {
        let undeck = Undeck::new().with_pages(PageSelection::Range(1..=5));
        assert!(matches!(
            undeck.options().render.page_selection,
            PageSelection::Range(_)
        ));
    }

    #[test]
    fn test_convert_bytes_unknown_format() {
        let result = Undeck::new().convert_bytes(b"<!DOCTYPE html><html></html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_convert_bytes_empty_data() {
        assert!(Undeck::new().convert_bytes(&[]).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(convert_pptx_to_markdown("does-not-exist.pptx", true).is_err());
        assert!(convert_pdf_to_markdown("does-not-exist.pdf").is_err());
        assert!(to_markdown("does-not-exist").is_err());
    }

    #[test]
    fn test_missing_file_yields_no_links() {
        assert!(extract_pptx_hyperlinks("does-not-exist.pptx").is_empty());
        assert!(extract_pdf_hyperlinks("does-not-exist.pdf").is_empty());
    }
}
