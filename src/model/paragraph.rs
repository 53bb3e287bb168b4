//! Paragraph and run-level types of a slide text body.

use serde::{Deserialize, Serialize};

/// A paragraph (`a:p`) of a text body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in document order
    pub runs: Vec<TextRun>,

    /// Paragraph properties from `a:pPr`
    pub properties: ParagraphProperties,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(TextRun::new(text));
        p
    }

    /// Add a run.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Set the outline level.
    pub fn with_level(mut self, level: u8) -> Self {
        self.properties.level = Some(level);
        self
    }

    /// Set the bullet style.
    pub fn with_bullet(mut self, bullet: BulletStyle) -> Self {
        self.properties.bullet = bullet;
        self
    }

    /// Concatenated run text, line breaks included.
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|r| if r.line_break { "\n" } else { r.text.as_str() })
            .collect()
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Check if any run carries a hyperlink.
    pub fn has_links(&self) -> bool {
        self.runs.iter().any(|r| r.hyperlink.is_some())
    }
}

/// Paragraph properties relevant to list and heading detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    /// Outline level (`lvl` attribute), if explicitly set
    pub level: Option<u8>,

    /// Bullet specification
    pub bullet: BulletStyle,
}

/// Bullet specification of a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BulletStyle {
    /// No bullet element; inherited from the placeholder or master
    #[default]
    Inherit,
    /// `a:buNone`
    None,
    /// `a:buChar` (or `a:buFont` alone)
    Char(String),
    /// `a:buAutoNum` with its numbering scheme
    AutoNumber(String),
}

/// A run of text with consistent styling (`a:r`, `a:fld` or `a:br`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    pub style: TextStyle,

    /// Resolved click target (`a:hlinkClick`)
    pub hyperlink: Option<String>,

    /// Whether this run is a line break
    pub line_break: bool,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle {
                bold: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create a line break run.
    pub fn line_break() -> Self {
        Self {
            line_break: true,
            ..Default::default()
        }
    }

    /// Attach a hyperlink target.
    pub fn with_hyperlink(mut self, url: impl Into<String>) -> Self {
        self.hyperlink = Some(url.into());
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && !self.line_break
    }
}

/// Text styling properties (`a:rPr`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Strikethrough text
    pub strikethrough: bool,
}

impl TextStyle {
    /// Whether the style carries any emphasis rendered in Markdown.
    pub fn has_emphasis(&self) -> bool {
        self.bold || self.italic
    }
}
