//! End-to-end tests for PowerPoint conversion.

mod common;

use common::{
    broken_shape, linked_box, linked_run, para, temp_dir, text_box, title_shape, PptxBuilder,
    SlideFixture,
};
use undeck::convert::{ConvertOptions, DocumentConverter, OutputFormat, PptxConverter};
use undeck::model::{BlockPayload, ReadingStrategy, StructuredPresentation};
use undeck::{convert_pptx_to_markdown, extract_pptx_hyperlinks, Location};

fn welcome_deck() -> PptxBuilder {
    let body = format!("<a:p>{}</a:p>", linked_run("Hello", "rId2", true));
    PptxBuilder::new().title("Quarterly Review").slide(
        SlideFixture::new()
            .shape(title_shape(2, "Welcome", 274638))
            .shape(text_box(3, "TextBox 2", 457200, 2000000, &body))
            .link("rId2", "example.com"),
    )
}

#[test]
fn test_title_then_linked_text() {
    let dir = temp_dir();
    let path = welcome_deck().write_to(dir.path(), "welcome.pptx");

    let markdown = convert_pptx_to_markdown(&path, true).unwrap();

    let title = markdown.find("# Welcome").expect("title heading");
    let hello = markdown
        .find("[Hello](https://example.com)")
        .expect("inline link");
    assert!(title < hello);
    assert!(markdown.contains("**[Hello](https://example.com)**"));
    assert!(markdown.starts_with("<!-- Slide 1 -->"));

    assert!(markdown.contains("## Hyperlinks in Presentation"));
    assert!(markdown.contains("### Slide 1"));
    assert!(markdown.ends_with("* [Hello](https://example.com)"));
}

#[test]
fn test_extract_structured_orders_title_first() {
    let dir = temp_dir();
    let path = welcome_deck().write_to(dir.path(), "welcome.pptx");

    let extracted = PptxConverter::new()
        .extract_structured(&path, &ConvertOptions::default())
        .unwrap();
    assert!(extracted.is_clean());

    let structured = extracted.value;
    assert_eq!(structured.slide_count(), 1);
    assert_eq!(structured.metadata.title.as_deref(), Some("Quarterly Review"));

    let slide = &structured.slides[0];
    assert_eq!(slide.strategy, ReadingStrategy::Accessibility);
    assert_eq!(slide.blocks.len(), 2);
    assert_eq!(slide.blocks[0].order_rank, 0);
    assert_eq!(slide.blocks[1].order_rank, 1);
    match &slide.blocks[0].payload {
        BlockPayload::Text { paragraphs } => assert_eq!(paragraphs[0].text(), "Welcome"),
        other => panic!("expected title text, got {:?}", other),
    }

    assert_eq!(structured.hyperlinks.len(), 1);
    assert_eq!(structured.hyperlinks[0].text, "Hello");
    assert_eq!(structured.hyperlinks[0].url, "https://example.com");
    assert_eq!(structured.hyperlinks[0].location, Location::Slide(1));
}

#[test]
fn test_accessibility_order_beats_spatial() {
    let dir = temp_dir();
    let path = PptxBuilder::new()
        .slide(
            SlideFixture::new()
                .shape(text_box(2, "TextBox 1", 457200, 0, &para("Intro notes")))
                .shape(title_shape(3, "Agenda", 3000000)),
        )
        .write_to(dir.path(), "order.pptx");

    let accessible = convert_pptx_to_markdown(&path, true).unwrap();
    assert!(accessible.find("# Agenda").unwrap() < accessible.find("Intro notes").unwrap());

    let spatial = convert_pptx_to_markdown(&path, false).unwrap();
    assert!(spatial.find("Intro notes").unwrap() < spatial.find("# Agenda").unwrap());
}

#[test]
fn test_spatial_rows_read_left_to_right() {
    let dir = temp_dir();
    let path = PptxBuilder::new()
        .slide(
            SlideFixture::new()
                .shape(text_box(2, "Right", 4800000, 1000000, &para("Second column")))
                .shape(text_box(3, "Left", 100000, 1000000, &para("First column")))
                .shape(text_box(4, "Below", 100000, 4000000, &para("Footer note"))),
        )
        .write_to(dir.path(), "columns.pptx");

    let markdown = convert_pptx_to_markdown(&path, true).unwrap();
    let first = markdown.find("First column").unwrap();
    let second = markdown.find("Second column").unwrap();
    let below = markdown.find("Footer note").unwrap();
    assert!(first < second);
    assert!(second < below);
}

#[test]
fn test_malformed_shape_skipped_siblings_survive() {
    let dir = temp_dir();
    let path = PptxBuilder::new()
        .slide(
            SlideFixture::new()
                .shape(title_shape(2, "Survivor", 274638))
                .shape(broken_shape(3))
                .shape(text_box(4, "TextBox 3", 457200, 2000000, &para("Still here"))),
        )
        .write_to(dir.path(), "broken.pptx");

    let result = PptxConverter::new()
        .convert(&path, &ConvertOptions::default())
        .unwrap();
    assert!(result.content.contains("# Survivor"));
    assert!(result.content.contains("Still here"));
    assert!(!result.content.contains("bogus"));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(
        result.diagnostics[0].location,
        undeck::DiagnosticLocation::Slide(1)
    );
}

#[test]
fn test_malformed_shape_fails_in_strict_mode() {
    let dir = temp_dir();
    let path = PptxBuilder::new()
        .slide(SlideFixture::new().shape(broken_shape(2)))
        .write_to(dir.path(), "strict.pptx");

    let options = ConvertOptions::new().with_error_mode(undeck::ErrorMode::Strict);
    assert!(PptxConverter::new().convert(&path, &options).is_err());
}

#[test]
fn test_textless_shape_link_gets_slide_label() {
    let dir = temp_dir();
    let path = PptxBuilder::new()
        .slide(SlideFixture::new().shape(title_shape(2, "Intro", 274638)))
        .slide(
            SlideFixture::new()
                .shape(linked_box(2, "rId5", 100000, 100000, "<a:p/>"))
                .link("rId5", "https://example.com/signup"),
        )
        .write_to(dir.path(), "button.pptx");

    let links = extract_pptx_hyperlinks(&path);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].text, "Link on Slide 2");
    assert_eq!(links[0].url, "https://example.com/signup");
    assert_eq!(links[0].location, Location::Slide(2));
    assert!(links[0].synthesized);
}

#[test]
fn test_shape_link_wraps_single_line_text() {
    let dir = temp_dir();
    let path = PptxBuilder::new()
        .slide(
            SlideFixture::new()
                .shape(linked_box(2, "rId3", 100000, 100000, &para("Sign up")))
                .link("rId3", "www.example.com/signup"),
        )
        .write_to(dir.path(), "wrapped.pptx");

    let markdown = convert_pptx_to_markdown(&path, true).unwrap();
    assert!(markdown.contains("[Sign up](https://www.example.com/signup)"));
    assert!(markdown.contains("* [Sign up](https://www.example.com/signup)"));
}

#[test]
fn test_slide_selection() {
    let dir = temp_dir();
    let path = PptxBuilder::new()
        .slide(SlideFixture::new().shape(title_shape(2, "One", 274638)))
        .slide(SlideFixture::new().shape(title_shape(2, "Two", 274638)))
        .slide(SlideFixture::new().shape(title_shape(2, "Three", 274638)))
        .write_to(dir.path(), "three.pptx");

    let options = ConvertOptions::new()
        .with_render_options(undeck::RenderOptions::new().with_page_list(vec![2]));
    let result = PptxConverter::new().convert(&path, &options).unwrap();

    assert!(result.content.contains("<!-- Slide 2 -->"));
    assert!(result.content.contains("# Two"));
    assert!(!result.content.contains("# One"));
    assert!(!result.content.contains("# Three"));
}

#[test]
fn test_slide_selection_keeps_deck_reading_order() {
    let dir = temp_dir();
    let path = PptxBuilder::new()
        .slide(SlideFixture::new().shape(title_shape(2, "Overview", 274638)))
        .slide(
            SlideFixture::new()
                .shape(text_box(2, "TextBox 1", 100000, 3000000, &para("Earlier")))
                .shape(text_box(3, "TextBox 2", 100000, 100000, &para("Later"))),
        )
        .write_to(dir.path(), "selection-order.pptx");

    let converter = PptxConverter::new();
    let full = converter.convert(&path, &ConvertOptions::default()).unwrap();
    assert!(full.content.find("Earlier").unwrap() < full.content.find("Later").unwrap());

    let options = ConvertOptions::new()
        .with_render_options(undeck::RenderOptions::new().with_page_list(vec![2]));
    let extracted = converter.extract_structured(&path, &options).unwrap().value;
    assert_eq!(extracted.slides.len(), 1);
    assert_eq!(extracted.slides[0].strategy, ReadingStrategy::Accessibility);

    let selected = converter.convert(&path, &options).unwrap();
    assert!(selected.content.find("Earlier").unwrap() < selected.content.find("Later").unwrap());
    assert!(!selected.content.contains("Overview"));
    assert_eq!(selected.metadata.page_count, 2);
}

#[test]
fn test_heading_candidates_promoted_by_default() {
    let dir = temp_dir();
    let body = format!(
        "{}{}{}",
        para("KEY FINDINGS"),
        para("Regional results across all markets"),
        para("Revenue grew in every region."),
    );
    let path = PptxBuilder::new()
        .slide(SlideFixture::new().shape(text_box(2, "TextBox 1", 100000, 100000, &body)))
        .write_to(dir.path(), "findings.pptx");

    let markdown = convert_pptx_to_markdown(&path, true).unwrap();
    assert!(markdown.contains("## KEY FINDINGS"));
    assert!(markdown.contains("### Regional results across all markets"));
    assert!(markdown.contains("\n\nRevenue grew in every region."));

    let options = ConvertOptions::new()
        .with_render_options(undeck::RenderOptions::new().with_heading_promotion(false));
    let plain = PptxConverter::new().convert(&path, &options).unwrap();
    assert!(!plain.content.contains("## KEY FINDINGS"));
    assert!(plain.content.contains("KEY FINDINGS"));
}

#[test]
fn test_json_output_round_trips_structure() {
    let dir = temp_dir();
    let path = welcome_deck().write_to(dir.path(), "welcome.pptx");

    let options = ConvertOptions::new().with_format(OutputFormat::Json);
    let result = PptxConverter::new().convert(&path, &options).unwrap();
    assert_eq!(result.mime_type, "application/json");

    let structured: StructuredPresentation = serde_json::from_str(&result.content).unwrap();
    assert_eq!(structured.slides.len(), 1);
    assert_eq!(structured.hyperlinks[0].url, "https://example.com");
}

#[test]
fn test_convert_bytes_matches_file() {
    let dir = temp_dir();
    let builder = welcome_deck();
    let path = builder.write_to(dir.path(), "welcome.pptx");

    let converter = PptxConverter::new();
    let options = ConvertOptions::default();
    let from_file = converter.convert(&path, &options).unwrap();
    let from_bytes = converter.convert_bytes(&builder.to_bytes(), &options).unwrap();
    assert_eq!(from_file.content, from_bytes.content);
}
