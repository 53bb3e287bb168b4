//! PDF page types.

use serde::{Deserialize, Serialize};

use super::{HyperlinkRecord, Metadata};

/// A parsed PDF: metadata plus text blocks per page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfDocument {
    pub metadata: Metadata,
    pub pages: Vec<Page>,
}

impl PdfDocument {
    /// Get the number of parsed pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// A PDF after extraction, with its hyperlinks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredDocument {
    #[serde(flatten)]
    pub document: PdfDocument,
    pub hyperlinks: Vec<HyperlinkRecord>,
}

/// A single PDF page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text blocks in reading order
    pub blocks: Vec<PageBlock>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: PageBlock) {
        self.blocks.push(block);
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the page has no text.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.text.trim().is_empty())
    }
}

/// A block of text recovered from page layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBlock {
    pub text: String,

    /// Heading level (1-6), or 0 for body text
    pub heading_level: u8,
}

impl PageBlock {
    /// Create a body text block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heading_level: 0,
        }
    }

    /// Create a heading block.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            heading_level: level.clamp(1, 6),
        }
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_text() {
        let mut page = Page::letter(1);
        assert!(page.is_empty());
        page.add_block(PageBlock::heading("Intro", 9));
        page.add_block(PageBlock::paragraph("Body text."));
        assert_eq!(page.plain_text(), "Intro\n\nBody text.");
        assert_eq!(page.blocks[0].heading_level, 6);
        assert!(!page.blocks[1].is_heading());
    }
}
