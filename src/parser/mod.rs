//! Document parsing: the OOXML package and shape tree for PPTX, text geometry and
//! annotations for PDF.

mod chart;
pub(crate) mod container;
mod layout;
mod options;
mod pdf;
mod pptx;
pub(crate) mod slide;

pub use container::{OoxmlContainer, Relationship, Relationships};
pub use layout::{
    sort_reading_order, BBox, BlockType, FontStatistics, LayoutAnalyzer, TextBlock, TextLine,
    TextSpan, Word, GLYPH_WIDTH_RATIO,
};
pub use options::{ErrorMode, ParseOptions};
pub use pdf::{LinkAnnotation, LinkTarget, PdfParser};
pub use pptx::PptxParser;
