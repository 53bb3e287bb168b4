//! Document converters and the registry that dispatches between them.
//!
//! # Example
//!
//! ```no_run
//! use undeck::convert::{ConverterRegistry, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> undeck::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let result = registry.convert(Path::new("deck.pptx"), &ConvertOptions::default())?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod context;
mod pdf;
mod pptx;

pub use context::ConversionContext;
pub use pdf::PdfConverter;
pub use pptx::PptxConverter;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::detect::detect_format_from_path;
use crate::enhance::MarkdownEnhancer;
use crate::error::{Diagnostic, Error, Result};
use crate::extract::ReadingOrderOptions;
use crate::links::LinkOptions;
use crate::model::Metadata;
use crate::parser::{ErrorMode, ParseOptions};
use crate::render::{ExtractionStats, RenderOptions};

/// Options for document conversion.
#[derive(Clone, Default)]
pub struct ConvertOptions {
    /// Rendering options
    pub render: RenderOptions,

    /// Reading-order options (presentations)
    pub reading_order: ReadingOrderOptions,

    /// Hyperlink extraction options (PDF)
    pub links: LinkOptions,

    /// Error handling mode while parsing
    pub error_mode: ErrorMode,

    /// Whether to collect statistics during conversion
    pub collect_stats: bool,

    /// Output format
    pub output_format: OutputFormat,

    /// Markdown post-processor
    pub enhancer: Option<Arc<dyn MarkdownEnhancer>>,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set reading-order options.
    pub fn with_reading_order(mut self, options: ReadingOrderOptions) -> Self {
        self.reading_order = options;
        self
    }

    /// Prefer or ignore accessibility metadata when ordering shapes.
    pub fn with_accessibility_order(mut self, enabled: bool) -> Self {
        self.reading_order.use_accessibility_order = enabled;
        self
    }

    /// Set PDF hyperlink options.
    pub fn with_link_options(mut self, options: LinkOptions) -> Self {
        self.links = options;
        self
    }

    /// Set the parse error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Post-process the assembled Markdown.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn MarkdownEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Parse options derived from these options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_error_mode(self.error_mode)
            .with_pages(self.render.page_selection.clone())
    }

    /// Render options with statistics enabled when either layer asks for them.
    pub fn render_options(&self) -> RenderOptions {
        let collect = self.collect_stats || self.render.collect_stats;
        self.render.clone().with_stats(collect)
    }
}

impl fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("render", &self.render)
            .field("reading_order", &self.reading_order)
            .field("links", &self.links)
            .field("error_mode", &self.error_mode)
            .field("collect_stats", &self.collect_stats)
            .field("output_format", &self.output_format)
            .field("enhancer", &self.enhancer.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown format
    #[default]
    Markdown,

    /// Structured slides or pages, metadata and hyperlinks as JSON
    Json,
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Converted content
    pub content: String,

    /// Source document metadata
    pub metadata: Metadata,

    /// Extraction statistics (if collected)
    pub stats: Option<ExtractionStats>,

    /// MIME type of the output
    pub mime_type: &'static str,

    /// Problems skipped over during extraction
    pub diagnostics: Vec<Diagnostic>,

    /// Why enhancement was not applied, when an enhancer was configured and failed
    pub enhancement_error: Option<String>,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(content: String, metadata: Metadata) -> Self {
        Self {
            content,
            metadata,
            stats: None,
            mime_type: "text/markdown",
            diagnostics: Vec::new(),
            enhancement_error: None,
        }
    }

    /// Set extraction statistics.
    pub fn with_stats(mut self, stats: ExtractionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Attach diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new document format.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult>;

    /// Convert from bytes.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters and provides
/// convenient methods for converting documents.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the PPTX and PDF converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PptxConverter::new()));
        registry.register(Arc::new(PdfConverter::new()));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters
                .insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.converters.keys().map(|s| s.as_str()).collect()
    }

    /// Convert a file using the appropriate converter.
    ///
    /// Files without a known extension are dispatched on their detected format.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if self.supports(ext) => ext.to_string(),
            _ => detect_format_from_path(path)?.extension().to_string(),
        };

        let converter = self
            .get_by_extension(&ext)
            .ok_or_else(|| Error::Other(format!("No converter for extension: {}", ext)))?;

        converter.convert(path, options)
    }

    /// Convert bytes using the specified extension to determine the converter.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::Other(format!("No converter for extension: {}", ext)))?;

        converter.convert_bytes(bytes, options)
    }

    /// Convert independent files in parallel.
    ///
    /// Results are returned in input order; each file succeeds or fails on its own.
    pub fn convert_many(
        &self,
        paths: &[PathBuf],
        options: &ConvertOptions,
    ) -> Vec<(PathBuf, Result<ConvertResult>)> {
        paths
            .par_iter()
            .map(|path| (path.clone(), self.convert(path, options)))
            .collect()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_accessibility_order(false)
            .with_error_mode(ErrorMode::Strict)
            .with_stats(true)
            .with_format(OutputFormat::Json);

        assert!(!options.reading_order.use_accessibility_order);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.collect_stats);
        assert_eq!(options.output_format, OutputFormat::Json);
        assert_eq!(options.parse_options().error_mode, ErrorMode::Strict);
    }

    #[test]
    fn test_convert_options_debug_names_enhancer() {
        let enhancer = |md: &str, _: &crate::enhance::EnhanceContext| -> Result<String> {
            Ok(md.to_string())
        };
        let options = ConvertOptions::new().with_enhancer(Arc::new(enhancer));
        let debug = format!("{:?}", options);
        assert!(debug.contains("enhancer: Some(\"custom\")"));
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.supports("pdf"));
        assert!(registry.supports("PPTX"));
        assert!(!registry.supports("docx"));
    }

    #[test]
    fn test_registry_get_by_name() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.get_by_extension("pptx").unwrap().name(), "pptx");
        assert!(registry.get_by_name("pdf").is_some());
    }

    #[test]
    fn test_convert_many_reports_each_file() {
        let registry = ConverterRegistry::with_defaults();
        let paths = vec![PathBuf::from("missing-a.pptx"), PathBuf::from("missing-b.pdf")];
        let results = registry.convert_many(&paths, &ConvertOptions::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, paths[0]);
        assert!(results.iter().all(|(_, r)| r.is_err()));
    }
}
