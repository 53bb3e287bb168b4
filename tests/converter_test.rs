//! Integration tests for the converter module.

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{temp_dir, text_box, title_shape, para, write_pdf, PptxBuilder, SlideFixture};
use undeck::convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, OutputFormat, PdfConverter,
    PptxConverter,
};
use undeck::enhance::EnhanceContext;
use undeck::error::{Error, Result};
use undeck::render::ExtractionStats;
use undeck::{MetadataStyle, RenderOptions, Undeck};

/// Mock converter for testing.
struct MockConverter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockConverter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl DocumentConverter for MockConverter {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn convert(&self, _path: &Path, _options: &ConvertOptions) -> Result<ConvertResult> {
        Ok(ConvertResult::new(
            format!("Converted by {}", self.name),
            Default::default(),
        ))
    }

    fn convert_bytes(&self, _bytes: &[u8], _options: &ConvertOptions) -> Result<ConvertResult> {
        Ok(ConvertResult::new(
            format!("Converted bytes by {}", self.name),
            Default::default(),
        ))
    }
}

fn sample_deck(dir: &Path, name: &str, title: &str) -> PathBuf {
    PptxBuilder::new()
        .title("Sample")
        .slide(
            SlideFixture::new()
                .shape(title_shape(2, title, 274638))
                .shape(text_box(3, "TextBox 2", 457200, 2000000, &para("Body text here"))),
        )
        .write_to(dir, name)
}

#[test]
fn test_converter_registry_new() {
    let registry = ConverterRegistry::new();

    // Empty registry should support nothing
    assert!(!registry.supports("pptx"));
    assert!(!registry.supports("pdf"));
}

#[test]
fn test_converter_registry_register() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockConverter::new(vec!["key", "odp"], "keynote")));

    assert!(registry.supports("key"));
    assert!(registry.supports("ODP")); // Case insensitive
    assert!(registry.get_by_name("KEYNOTE").is_some());
}

#[test]
fn test_converter_registry_get_by_extension() {
    let registry = ConverterRegistry::with_defaults();

    assert_eq!(registry.get_by_extension("pptx").unwrap().name(), "pptx");
    assert_eq!(registry.get_by_extension("PDF").unwrap().name(), "pdf");
    assert!(registry.get_by_extension("docx").is_none());
}

#[test]
fn test_supported_extensions() {
    let registry = ConverterRegistry::with_defaults();
    let mut extensions = registry.supported_extensions();
    extensions.sort_unstable();
    assert_eq!(extensions, vec!["pdf", "pptx"]);
}

#[test]
fn test_convert_result_methods() {
    let result = ConvertResult::new("# Hello".to_string(), Default::default());

    assert_eq!(result.content, "# Hello");
    assert_eq!(result.content_len(), 7);
    assert!(result.stats.is_none());
    assert!(result.diagnostics.is_empty());
    assert!(result.enhancement_error.is_none());
    assert_eq!(result.mime_type, "text/markdown");
}

#[test]
fn test_convert_result_with_stats() {
    let stats = ExtractionStats {
        slide_count: 5,
        link_count: 3,
        ..Default::default()
    };

    let result = ConvertResult::new("content".to_string(), Default::default()).with_stats(stats);
    let stats = result.stats.unwrap();
    assert_eq!(stats.slide_count, 5);
    assert_eq!(stats.link_count, 3);
}

#[test]
fn test_output_format_default() {
    assert_eq!(OutputFormat::default(), OutputFormat::Markdown);
}

#[test]
fn test_registry_dispatches_by_extension() {
    let dir = temp_dir();
    let deck = sample_deck(dir.path(), "deck.pptx", "Roadmap");
    let pdf = write_pdf(dir.path(), "notes.pdf", &[("Meeting notes", vec![])]);

    let registry = ConverterRegistry::with_defaults();
    let options = ConvertOptions::default();

    let deck_result = registry.convert(&deck, &options).unwrap();
    assert!(deck_result.content.contains("# Roadmap"));

    let pdf_result = registry.convert(&pdf, &options).unwrap();
    assert!(pdf_result.content.contains("Meeting notes"));
}

#[test]
fn test_registry_detects_format_without_extension() {
    let dir = temp_dir();
    let deck = sample_deck(dir.path(), "deck-without-extension", "Detected");

    let result = ConverterRegistry::with_defaults()
        .convert(&deck, &ConvertOptions::default())
        .unwrap();
    assert!(result.content.contains("# Detected"));
}

#[test]
fn test_registry_convert_unknown_content_error() {
    let dir = temp_dir();
    let path = dir.path().join("notes.xyz");
    std::fs::write(&path, "just some text").unwrap();

    let result = ConverterRegistry::with_defaults().convert(&path, &ConvertOptions::default());
    assert!(matches!(result, Err(Error::UnknownFormat)));
}

#[test]
fn test_registry_convert_bytes_unsupported() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert_bytes(b"test", "xyz", &ConvertOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_convert_many_independent_results() {
    let dir = temp_dir();
    let paths = vec![
        sample_deck(dir.path(), "a.pptx", "Alpha"),
        dir.path().join("missing.pptx"),
        sample_deck(dir.path(), "b.pptx", "Beta"),
    ];

    let results = ConverterRegistry::with_defaults().convert_many(&paths, &ConvertOptions::default());
    assert_eq!(results.len(), 3);

    let by_path = |name: &str| {
        results
            .iter()
            .find(|(p, _)| p.ends_with(name))
            .map(|(_, r)| r)
            .unwrap()
    };
    assert!(by_path("a.pptx").as_ref().unwrap().content.contains("# Alpha"));
    assert!(by_path("missing.pptx").is_err());
    assert!(by_path("b.pptx").as_ref().unwrap().content.contains("# Beta"));
}

#[test]
fn test_stats_collected_on_request() {
    let dir = temp_dir();
    let deck = sample_deck(dir.path(), "deck.pptx", "Stats");

    let converter = PptxConverter::new();
    let without = converter.convert(&deck, &ConvertOptions::default()).unwrap();
    assert!(without.stats.is_none());

    let with = converter
        .convert(&deck, &ConvertOptions::new().with_stats(true))
        .unwrap();
    let stats = with.stats.unwrap();
    assert_eq!(stats.slide_count, 1);
    assert_eq!(stats.block_count, 2);
    assert!(stats.word_count >= 4);
}

#[test]
fn test_metadata_frontmatter() {
    let dir = temp_dir();
    let deck = sample_deck(dir.path(), "deck.pptx", "Roadmap");

    let options = ConvertOptions::new()
        .with_render_options(RenderOptions::new().with_metadata(MetadataStyle::Frontmatter));
    let result = PptxConverter::new().convert(&deck, &options).unwrap();

    assert!(result.content.starts_with("---\ntitle: \"Sample\""));
    assert_eq!(result.metadata.title.as_deref(), Some("Sample"));
    assert_eq!(result.metadata.page_count, 1);
}

#[test]
fn test_enhancer_applied() {
    let dir = temp_dir();
    let deck = sample_deck(dir.path(), "deck.pptx", "Roadmap");

    let enhancer = |markdown: &str, ctx: &EnhanceContext| -> Result<String> {
        Ok(format!(
            "{}\n\n<!-- enhanced {} -->",
            markdown,
            ctx.file_name.as_deref().unwrap_or("?")
        ))
    };
    let options = ConvertOptions::new().with_enhancer(Arc::new(enhancer));
    let result = PptxConverter::new().convert(&deck, &options).unwrap();

    assert!(result.content.ends_with("<!-- enhanced deck.pptx -->"));
    assert!(result.enhancement_error.is_none());
}

#[test]
fn test_enhancer_failure_keeps_markdown() {
    let dir = temp_dir();
    let deck = sample_deck(dir.path(), "deck.pptx", "Roadmap");

    let plain = PptxConverter::new()
        .convert(&deck, &ConvertOptions::default())
        .unwrap();

    let failing = |_: &str, _: &EnhanceContext| -> Result<String> {
        Err(Error::Other("model offline".to_string()))
    };
    let options = ConvertOptions::new().with_enhancer(Arc::new(failing));
    let result = PptxConverter::new().convert(&deck, &options).unwrap();

    assert_eq!(result.content, plain.content);
    assert!(result.enhancement_error.unwrap().contains("model offline"));
}

#[test]
fn test_pdf_converter_json() {
    let dir = temp_dir();
    let pdf = write_pdf(dir.path(), "notes.pdf", &[("Meeting notes", vec![])]);

    let options = ConvertOptions::new().with_format(OutputFormat::Json);
    let result = PdfConverter::new().convert(&pdf, &options).unwrap();

    let value: serde_json::Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(value["pages"].as_array().unwrap().len(), 1);
    assert!(value["hyperlinks"].as_array().unwrap().is_empty());
    assert_eq!(value["metadata"]["page_count"], 1);
}

#[test]
fn test_undeck_builder_converts() {
    let dir = temp_dir();
    let deck = sample_deck(dir.path(), "deck.pptx", "Builder");

    let markdown = Undeck::new()
        .without_slide_markers()
        .without_hyperlink_section()
        .convert(&deck)
        .unwrap();
    assert!(markdown.starts_with("# Builder"));

    let bytes = std::fs::read(&deck).unwrap();
    let result = Undeck::new().convert_bytes(&bytes).unwrap();
    assert!(result.content.contains("# Builder"));
}
