//! Document-level types.

use super::{Rect, Shape};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default slide size (16:9, 13.333in x 7.5in) in EMU.
pub const DEFAULT_SLIDE_WIDTH: i64 = 12_192_000;
pub const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;

/// A parsed presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Slide size in EMU (`p:sldSz`)
    pub slide_size: SlideSize,

    /// Slides in presentation order
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create a new empty presentation.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            slide_size: SlideSize::default(),
            slides: Vec::new(),
        }
    }

    /// Get the number of slides.
    pub fn slide_count(&self) -> u32 {
        self.slides.len() as u32
    }

    /// Get a slide by number (1-indexed).
    pub fn get_slide(&self, number: u32) -> Option<&Slide> {
        if number == 0 {
            return None;
        }
        self.slides.get((number - 1) as usize)
    }

    /// Add a slide.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Check if the presentation has any slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Whether any shape carries accessibility metadata (placeholders or alt text).
    pub fn exposes_accessibility_metadata(&self) -> bool {
        self.slides
            .iter()
            .flat_map(|s| &s.shapes)
            .any(|shape| shape.has_accessibility_metadata())
    }

    /// Whether any shape has a bounding box.
    pub fn has_geometry(&self) -> bool {
        self.slides
            .iter()
            .flat_map(|s| &s.shapes)
            .any(|shape| shape.bounds.is_some())
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide dimensions in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width: i64,
    pub height: i64,
}

impl Default for SlideSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_SLIDE_WIDTH,
            height: DEFAULT_SLIDE_HEIGHT,
        }
    }
}

impl SlideSize {
    /// Whether a box ends in the bottom band of the slide (footer zone).
    pub fn is_footer_zone(&self, bounds: &Rect) -> bool {
        if self.height <= 0 {
            return false;
        }
        (bounds.bottom() as f64 / self.height as f64) > 0.85
    }
}

/// A slide and its shape tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    /// Slide number (1-indexed)
    pub number: u32,

    /// Top-level shapes in document (z-) order
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new empty slide.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Add a shape.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Check if the slide has no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Category
    pub category: Option<String>,

    /// Comments / description
    pub comments: Option<String>,

    /// Last modified by
    pub last_modified_by: Option<String>,

    /// Revision number
    pub revision: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Company
    pub company: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Source file name
    pub file_name: Option<String>,

    /// Format version (e.g. PDF "1.7")
    pub format_version: Option<String>,

    /// Total number of slides or pages
    pub page_count: u32,
}

impl Metadata {
    /// Create new metadata with a format version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            format_version: Some(version.into()),
            ..Default::default()
        }
    }

    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        let fields = [
            ("title", &self.title),
            ("author", &self.author),
            ("subject", &self.subject),
            ("keywords", &self.keywords),
            ("category", &self.category),
            ("creator", &self.creator),
            ("producer", &self.producer),
            ("last_modified_by", &self.last_modified_by),
            ("file", &self.file_name),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                lines.push(format!("{}: \"{}\"", key, escape_yaml(value)));
            }
        }
        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        if let Some(ref modified) = self.modified {
            lines.push(format!("modified: {}", modified.to_rfc3339()));
        }
        if let Some(ref version) = self.format_version {
            lines.push(format!("version: \"{}\"", escape_yaml(version)));
        }
        lines.push(format!("pages: {}", self.page_count));

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }

    /// Render metadata as an HTML comment block, e.g. `<!-- PRESENTATION METADATA: ... -->`.
    pub fn to_comment_block(&self, label: &str, count_label: &str) -> String {
        let mut lines = vec![format!("<!-- {} METADATA:", label.to_uppercase())];

        let fields = [
            ("Document Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Keywords", &self.keywords),
            ("Category", &self.category),
            ("Document Comments", &self.comments),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
            ("Company", &self.company),
            ("Last Modified By", &self.last_modified_by),
            ("Revision", &self.revision),
        ];
        for (key, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                lines.push(format!("{}: {}", key, sanitize_comment(value)));
            }
        }
        if let Some(ref created) = self.created {
            lines.push(format!("Created Date: {}", created.format("%Y-%m-%d %H:%M:%S")));
        }
        if let Some(ref modified) = self.modified {
            lines.push(format!("Last Modified: {}", modified.format("%Y-%m-%d %H:%M:%S")));
        }
        if let Some(ref file_name) = self.file_name {
            lines.push(format!("Filename: {}", sanitize_comment(file_name)));
        }
        lines.push(format!("{} Count: {}", count_label, self.page_count));
        lines.push("-->".to_string());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Keep values from terminating the surrounding HTML comment.
fn sanitize_comment(s: &str) -> String {
    s.replace("-->", "--\u{200B}>").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageRef, ShapeKind};

    #[test]
    fn test_presentation_new() {
        let pres = Presentation::new();
        assert!(pres.is_empty());
        assert_eq!(pres.slide_count(), 0);
        assert!(pres.get_slide(0).is_none());
    }

    #[test]
    fn test_presentation_accessibility_metadata() {
        let mut pres = Presentation::new();
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::new(ShapeKind::Decoration));
        pres.add_slide(slide);
        assert!(!pres.exposes_accessibility_metadata());

        let mut slide = Slide::new(2);
        slide.add_shape(Shape::new(ShapeKind::Picture(ImageRef::default())).with_alt_text("Chart"));
        pres.add_slide(slide);
        assert!(pres.exposes_accessibility_metadata());
    }

    #[test]
    fn test_metadata_frontmatter() {
        let mut metadata = Metadata::with_version("1.7");
        metadata.title = Some("Test Document".to_string());
        metadata.author = Some("Jane \"JD\" Doe".to_string());
        metadata.page_count = 10;

        let yaml = metadata.to_yaml_frontmatter();
        assert!(yaml.starts_with("---\n"));
        assert!(yaml.contains("title: \"Test Document\""));
        assert!(yaml.contains("author: \"Jane \\\"JD\\\" Doe\""));
        assert!(yaml.contains("version: \"1.7\""));
        assert!(yaml.contains("pages: 10"));
    }

    #[test]
    fn test_metadata_comment_block() {
        let metadata = Metadata {
            title: Some("Quarterly Review".to_string()),
            keywords: Some("  ".to_string()),
            file_name: Some("review.pptx".to_string()),
            page_count: 12,
            ..Default::default()
        };

        let block = metadata.to_comment_block("Presentation", "Slide");
        assert!(block.starts_with("<!-- PRESENTATION METADATA:"));
        assert!(block.contains("Document Title: Quarterly Review"));
        assert!(!block.contains("Keywords"));
        assert!(block.contains("Filename: review.pptx"));
        assert!(block.contains("Slide Count: 12"));
        assert!(block.ends_with("-->"));
    }

    #[test]
    fn test_footer_zone() {
        let size = SlideSize::default();
        assert!(size.is_footer_zone(&Rect::new(0, 6_300_000, 100, 400_000)));
        assert!(!size.is_footer_zone(&Rect::new(0, 100_000, 100, 400_000)));
    }
}
