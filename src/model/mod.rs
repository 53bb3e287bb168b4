//! Document model types.
//!
//! The shape tree ([`Presentation`], [`Slide`], [`Shape`]) is what the PPTX parser
//! produces; [`PdfDocument`] is the PDF counterpart. [`ContentBlock`]s are what the
//! extractor derives from the shape tree in reading order, and [`HyperlinkRecord`]s
//! are shared by both hyperlink extractors.

mod chart;
mod content;
mod document;
mod link;
mod page;
mod paragraph;
mod shape;
mod table;

pub use chart::{chart_type_label, Chart, ChartSeries};
pub use content::{
    BlockPayload, CellContent, ChartContent, ContentBlock, ConvertedSlide, FormattedParagraph,
    LinkSpan, ListKind, ReadingStrategy, StructuredPresentation,
};
pub use document::{
    Metadata, Presentation, Slide, SlideSize, DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH,
};
pub use link::{is_placeholder_text, HyperlinkRecord, Location};
pub use page::{Page, PageBlock, PdfDocument, StructuredDocument};
pub use paragraph::{BulletStyle, Paragraph, ParagraphProperties, TextRun, TextStyle};
pub use shape::{
    is_meaningful_alt_text, ImageRef, Placeholder, PlaceholderType, Rect, SemanticRole, Shape,
    ShapeKind, TextBody,
};
pub use table::{Table, TableCell, TableRow};
