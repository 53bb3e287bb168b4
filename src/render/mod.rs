//! Rendering extracted documents to Markdown and JSON.

mod json;
mod markdown;
mod options;
mod result;

pub use json::{to_json, JsonFormat};
pub use markdown::{
    pdf_to_markdown, pdf_to_markdown_with_stats, to_markdown, to_markdown_with_stats,
    MarkdownAssembler,
};
pub use options::{MetadataStyle, PageSelection, RenderOptions};
pub use result::{ExtractionStats, RenderResult};
