//! Hyperlink extraction, normalization and the hyperlink appendix.

mod pdf;
mod pptx;
mod section;
mod url;

use std::path::Path;

use crate::model::HyperlinkRecord;

pub use pdf::{LinkOptions, PdfLinkExtractor};
pub use pptx::{group_runs_by_link, LinkGroup, PptxLinkExtractor};
pub use section::format_hyperlinks_section;
pub use url::normalize_url;

/// Hyperlinks of a presentation, one entry per slide and URL.
///
/// Never fails: an unreadable file is logged and yields an empty list.
///
/// # Example
///
/// ```no_run
/// let links = undeck::extract_pptx_hyperlinks("deck.pptx");
/// for link in &links {
///     println!("{}: [{}]({})", link.location, link.text, link.url);
/// }
/// ```
pub fn extract_pptx_hyperlinks<P: AsRef<Path>>(path: P) -> Vec<HyperlinkRecord> {
    PptxLinkExtractor::new().extract_path(path).value
}

/// Hyperlinks of a PDF: link annotations plus URLs written out in the text.
///
/// Never fails: an unreadable file is logged and yields an empty list.
pub fn extract_pdf_hyperlinks<P: AsRef<Path>>(path: P) -> Vec<HyperlinkRecord> {
    PdfLinkExtractor::new().extract_path(path).value
}
