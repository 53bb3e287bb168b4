//! Rendering options and configuration.

use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::Error;

/// Options for assembling Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit `<!-- Slide N -->` / `<!-- Page N -->` before each slide or page
    pub slide_markers: bool,

    /// How document metadata is written at the top
    pub metadata: MetadataStyle,

    /// Append the `## Hyperlinks in ...` section
    pub hyperlink_section: bool,

    /// Render short unpunctuated paragraphs as `##`/`###` headings
    pub promote_heading_candidates: bool,

    /// Prefix for image paths in output (e.g., "./media/")
    pub image_path_prefix: String,

    /// Slide or page selection
    pub page_selection: PageSelection,

    /// Collect extraction statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable slide/page markers.
    pub fn with_slide_markers(mut self, enabled: bool) -> Self {
        self.slide_markers = enabled;
        self
    }

    /// Set the metadata style.
    pub fn with_metadata(mut self, style: MetadataStyle) -> Self {
        self.metadata = style;
        self
    }

    /// Shorthand for YAML front matter on or off.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.metadata = if include {
            MetadataStyle::Frontmatter
        } else {
            MetadataStyle::None
        };
        self
    }

    /// Enable or disable the hyperlink section.
    pub fn with_hyperlink_section(mut self, enabled: bool) -> Self {
        self.hyperlink_section = enabled;
        self
    }

    /// Enable or disable heading promotion.
    pub fn with_heading_promotion(mut self, enabled: bool) -> Self {
        self.promote_heading_candidates = enabled;
        self
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.page_selection = PageSelection::Range(range);
        self
    }

    /// Set specific pages.
    pub fn with_page_list(mut self, pages: Vec<u32>) -> Self {
        self.page_selection = PageSelection::Pages(pages);
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            slide_markers: true,
            metadata: MetadataStyle::None,
            hyperlink_section: true,
            promote_heading_candidates: true,
            image_path_prefix: String::new(),
            page_selection: PageSelection::All,
            collect_stats: false,
        }
    }
}

/// Where document metadata goes in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataStyle {
    /// No metadata
    #[default]
    None,
    /// `<!-- PRESENTATION METADATA: ... -->` comment block
    Comment,
    /// YAML front matter
    Frontmatter,
}

impl FromStr for MetadataStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(MetadataStyle::None),
            "comment" => Ok(MetadataStyle::Comment),
            "frontmatter" | "yaml" => Ok(MetadataStyle::Frontmatter),
            other => Err(format!("Unknown metadata style: {}", other)),
        }
    }
}

/// Slide or page selection.
#[derive(Debug, Clone, Default)]
pub enum PageSelection {
    /// All slides or pages
    #[default]
    All,
    /// A range (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific numbers (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = parse_bounds(start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = parse_bounds(start, end)?;
                for p in start..=end {
                    if !pages.contains(&p) {
                        pages.push(p);
                    }
                }
            } else {
                let p = parse_page(part)?;
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort();
        Ok(PageSelection::Pages(pages))
    }
}

impl FromStr for PageSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageSelection::parse(s).map_err(Error::InvalidPageRange)
    }
}

fn parse_page(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err("Page numbers start at 1".to_string()),
        Ok(p) => Ok(p),
        Err(_) => Err(format!("Invalid page number: {}", s.trim())),
    }
}

fn parse_bounds(start: &str, end: &str) -> Result<(u32, u32), String> {
    let start = parse_page(start)?;
    let end = parse_page(end)?;
    if start > end {
        return Err(format!("Range {}-{} is reversed", start, end));
    }
    Ok((start, end))
}
