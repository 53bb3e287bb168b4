//! Reading order and content extraction for presentations.
//!
//! [`ReadingOrderResolver`] orders the shapes of a slide; [`ShapeContentExtractor`] walks
//! them in that order and produces [`ContentBlock`](crate::model::ContentBlock)s, using
//! [`TextFormatter`] to classify paragraphs.

mod content;
mod order;
mod text;

pub use content::ShapeContentExtractor;
pub use order::{ReadingOrderEntry, ReadingOrderOptions, ReadingOrderResolver};
pub use text::{is_all_caps, is_heading_candidate, TextFormatter, BULLET_GLYPHS};
