//! Ordered content blocks produced from a slide's shape tree.

use serde::{Deserialize, Serialize};

use super::{HyperlinkRecord, Metadata, SemanticRole, TextRun};

/// How shapes on a slide were ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStrategy {
    /// Document order grouped by semantic role
    #[default]
    Accessibility,
    /// Row-bucketed top-to-bottom, left-to-right
    Spatial,
    /// Raw shape order
    Enumeration,
}

impl std::fmt::Display for ReadingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReadingStrategy::Accessibility => "accessibility",
            ReadingStrategy::Spatial => "spatial",
            ReadingStrategy::Enumeration => "enumeration",
        };
        f.write_str(name)
    }
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "level", rename_all = "snake_case")]
pub enum ListKind {
    #[default]
    None,
    Bullet(u8),
    Numbered(u8),
}

impl ListKind {
    pub fn is_list(&self) -> bool {
        !matches!(self, ListKind::None)
    }
}

/// A link attached to a char range of a paragraph's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpan {
    /// Start char offset (inclusive)
    pub start: usize,
    /// End char offset (exclusive)
    pub end: usize,
    pub record: HyperlinkRecord,
}

/// A paragraph after list and heading analysis, with list prefixes stripped from its runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedParagraph {
    pub runs: Vec<TextRun>,
    pub list: ListKind,
    pub heading_candidate: bool,
    pub all_caps: bool,
    pub links: Vec<LinkSpan>,
}

impl FormattedParagraph {
    /// Visible text of the paragraph.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| if r.line_break { "\n" } else { r.text.as_str() })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// A table cell after formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellContent {
    pub paragraphs: Vec<FormattedParagraph>,
}

/// A chart after extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartContent {
    pub title: Option<String>,
    pub chart_type: Option<String>,
    pub categories: Vec<String>,
    pub series: Vec<(Option<String>, Vec<String>)>,
}

/// Block payload, one variant per content kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockPayload {
    Text { paragraphs: Vec<FormattedParagraph> },
    Table { rows: Vec<Vec<CellContent>> },
    Image { alt_text: String, target: Option<String> },
    Chart(ChartContent),
    Group { children: Vec<ContentBlock> },
}

/// A unit of slide content in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Slide number (1-indexed)
    pub slide_number: u32,

    /// Position within the slide; unique per slide
    pub order_rank: u32,

    /// Semantic role of the source shape
    pub role: SemanticRole,

    /// Shape-level click target
    pub hyperlink: Option<String>,

    pub payload: BlockPayload,
}

impl ContentBlock {
    /// Create a block with no role-specific metadata.
    pub fn new(slide_number: u32, order_rank: u32, payload: BlockPayload) -> Self {
        Self {
            slide_number,
            order_rank,
            role: SemanticRole::Content,
            hyperlink: None,
            payload,
        }
    }

    /// An empty text block, used when a shape could not be extracted.
    pub fn empty_text(slide_number: u32, order_rank: u32) -> Self {
        Self::new(
            slide_number,
            order_rank,
            BlockPayload::Text {
                paragraphs: Vec::new(),
            },
        )
    }

    /// Whether the block renders to nothing.
    pub fn is_empty(&self) -> bool {
        match &self.payload {
            BlockPayload::Text { paragraphs } => paragraphs.iter().all(|p| p.is_empty()),
            BlockPayload::Table { rows } => rows.is_empty(),
            BlockPayload::Group { children } => children.iter().all(|c| c.is_empty()),
            BlockPayload::Image { .. } | BlockPayload::Chart(_) => false,
        }
    }
}

/// A slide after ordering and extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertedSlide {
    pub number: u32,
    pub strategy: ReadingStrategy,
    pub blocks: Vec<ContentBlock>,
}

/// A presentation after extraction: what the Markdown assembler and JSON output consume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredPresentation {
    pub metadata: Metadata,
    pub slides: Vec<ConvertedSlide>,
    pub hyperlinks: Vec<HyperlinkRecord>,
}

impl StructuredPresentation {
    pub fn slide_count(&self) -> u32 {
        self.slides.len() as u32
    }

    /// Hyperlinks found on one slide.
    pub fn slide_links(&self, number: u32) -> impl Iterator<Item = &HyperlinkRecord> {
        self.hyperlinks
            .iter()
            .filter(move |link| link.location.number() == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_paragraph_text() {
        let p = FormattedParagraph {
            runs: vec![TextRun::new("a"), TextRun::line_break(), TextRun::new("b")],
            ..Default::default()
        };
        assert_eq!(p.text(), "a\nb");
        assert!(!p.is_empty());
    }

    #[test]
    fn test_block_emptiness() {
        assert!(ContentBlock::empty_text(1, 0).is_empty());
        let image = ContentBlock::new(
            1,
            1,
            BlockPayload::Image {
                alt_text: "Image".to_string(),
                target: None,
            },
        );
        assert!(!image.is_empty());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(ReadingStrategy::Spatial.to_string(), "spatial");
    }
}
